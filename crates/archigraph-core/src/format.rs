//! Output formats, layout directions and curve styles.
//!
//! Each type parses from the spelling a caller writes in a diagram configuration
//! (`"svg"`, `"LR"`, `"ortho"`) and maps to the value the layout backend expects.
//! Parsing is the only place where unsupported values are detected; once a value
//! is one of these enums it is valid by construction.

use std::{fmt, str::FromStr};

use serde::Deserialize;

use crate::error::ValueError;

/// Image format of the rendered artifact.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpg,
    Svg,
    Pdf,
    /// The laid-out DOT description itself.
    Dot,
}

impl OutputFormat {
    /// Returns the file extension for this format (also the backend `-T` value).
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Svg => "svg",
            Self::Pdf => "pdf",
            Self::Dot => "dot",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpg),
            "svg" => Ok(Self::Svg),
            "pdf" => Ok(Self::Pdf),
            "dot" => Ok(Self::Dot),
            _ => Err(ValueError::unsupported(
                "output format",
                s,
                "png, jpg, svg, pdf, dot",
            )),
        }
    }
}

/// Rank direction of the laid-out graph.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Direction {
    /// Top to bottom
    TopBottom,
    /// Bottom to top
    BottomTop,
    /// Left to right (default)
    #[default]
    LeftRight,
    /// Right to left
    RightLeft,
}

impl Direction {
    /// Returns the DOT `rankdir` value.
    pub fn to_dot_value(self) -> &'static str {
        match self {
            Self::TopBottom => "TB",
            Self::BottomTop => "BT",
            Self::LeftRight => "LR",
            Self::RightLeft => "RL",
        }
    }
}

impl FromStr for Direction {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TB" => Ok(Self::TopBottom),
            "BT" => Ok(Self::BottomTop),
            "LR" => Ok(Self::LeftRight),
            "RL" => Ok(Self::RightLeft),
            _ => Err(ValueError::unsupported("direction", s, "TB, BT, LR, RL")),
        }
    }
}

/// How edges are routed by the layout backend.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum CurveStyle {
    /// Axis-aligned segments (default)
    #[default]
    Ortho,
    Curved,
    Spline,
    Polyline,
}

impl CurveStyle {
    /// Returns the DOT `splines` value.
    pub fn to_dot_value(self) -> &'static str {
        match self {
            Self::Ortho => "ortho",
            Self::Curved => "curved",
            Self::Spline => "spline",
            Self::Polyline => "polyline",
        }
    }
}

impl FromStr for CurveStyle {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ortho" => Ok(Self::Ortho),
            "curved" => Ok(Self::Curved),
            "spline" => Ok(Self::Spline),
            "polyline" => Ok(Self::Polyline),
            _ => Err(ValueError::unsupported(
                "curve style",
                s,
                "ortho, curved, spline, polyline",
            )),
        }
    }
}

macro_rules! string_conversions {
    ($ty:ty, $to:ident) => {
        impl TryFrom<String> for $ty {
            type Error = ValueError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.$to().to_string()
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.$to())
            }
        }
    };
}

string_conversions!(OutputFormat, extension);
string_conversions!(Direction, to_dot_value);
string_conversions!(CurveStyle, to_dot_value);
