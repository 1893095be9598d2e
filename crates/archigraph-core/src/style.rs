//! Edge style definitions.
//!
//! # Overview
//!
//! Exported types:
//! - [`LineStyle`]: Enum defining the line pattern of an edge (solid, dashed, dotted, bold)
//! - [`EdgeStyle`]: The style carrier: optional label, color and line style applied to
//!   the edges created by the next connection
//!
//! # Quick Start
//!
//! ```
//! use archigraph_core::{color::Color, style::{EdgeStyle, LineStyle}};
//!
//! let style = EdgeStyle::new()
//!     .with_label("deploy")
//!     .with_color(Color::new("purple").unwrap())
//!     .with_line_style(LineStyle::Dashed);
//!
//! assert_eq!(style.label(), Some("deploy"));
//! assert_eq!(style.line_style(), Some(LineStyle::Dashed));
//! ```
//!
//! # Backend Attribute Mapping
//!
//! | Field        | DOT attribute | Example Values            |
//! |--------------|---------------|---------------------------|
//! | `label`      | `label`       | `"push"`                  |
//! | `color`      | `color`       | `"darkred"`, `"#7B8894"`  |
//! | `line_style` | `style`       | `solid`, `dashed`, `bold` |

use std::{fmt, str::FromStr};

use serde::Deserialize;

use crate::{color::Color, error::ValueError};

/// Line pattern of an edge.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    /// Solid continuous line (default)
    #[default]
    Solid,
    /// Dashed line
    Dashed,
    /// Dotted line
    Dotted,
    /// Solid line drawn with a heavier stroke
    Bold,
}

impl LineStyle {
    /// Returns the DOT `style` value for this line style.
    pub fn to_dot_value(self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Dashed => "dashed",
            Self::Dotted => "dotted",
            Self::Bold => "bold",
        }
    }
}

impl FromStr for LineStyle {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solid" => Ok(Self::Solid),
            "dashed" => Ok(Self::Dashed),
            "dotted" => Ok(Self::Dotted),
            "bold" => Ok(Self::Bold),
            _ => Err(ValueError::unsupported(
                "line style",
                s,
                "solid, dashed, dotted, bold",
            )),
        }
    }
}

impl fmt::Display for LineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_dot_value())
    }
}

/// Style carrier for edges.
///
/// An `EdgeStyle` is a plain value: it does not belong to any diagram until it is
/// handed to a connection, which copies it onto every edge that connection creates.
/// All fields are optional; unset fields fall back to the theme's edge defaults.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct EdgeStyle {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    color: Option<Color>,
    #[serde(default, rename = "style")]
    line_style: Option<LineStyle>,
}

impl EdgeStyle {
    /// Creates an empty style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the style with its label set.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Returns the style with its color set.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Returns the style with its line style set.
    pub fn with_line_style(mut self, line_style: LineStyle) -> Self {
        self.line_style = Some(line_style);
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn color(&self) -> Option<&Color> {
        self.color.as_ref()
    }

    pub fn line_style(&self) -> Option<LineStyle> {
        self.line_style
    }

    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        self.label.is_none() && self.color.is_none() && self.line_style.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_style_default() {
        assert_eq!(LineStyle::default(), LineStyle::Solid);
    }

    #[test]
    fn test_line_style_from_str() {
        assert_eq!("dashed".parse::<LineStyle>().unwrap(), LineStyle::Dashed);
        assert_eq!("bold".parse::<LineStyle>().unwrap(), LineStyle::Bold);

        let err = "wavy".parse::<LineStyle>().unwrap_err();
        assert_eq!(err.kind(), "line style");
    }

    #[test]
    fn test_line_style_dot_value() {
        assert_eq!(LineStyle::Dotted.to_dot_value(), "dotted");
        assert_eq!(LineStyle::Solid.to_string(), "solid");
    }

    #[test]
    fn test_edge_style_builder() {
        let style = EdgeStyle::new()
            .with_label("CI")
            .with_color(Color::new("red").unwrap())
            .with_line_style(LineStyle::Dotted);

        assert_eq!(style.label(), Some("CI"));
        assert_eq!(style.color().map(Color::as_str), Some("red"));
        assert_eq!(style.line_style(), Some(LineStyle::Dotted));
        assert!(!style.is_empty());
    }

    #[test]
    fn test_edge_style_empty() {
        assert!(EdgeStyle::new().is_empty());
    }
}
