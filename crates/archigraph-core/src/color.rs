//! Color handling for archigraph diagrams
//!
//! This module provides the [`Color`] type. Colors are validated with the CSS color
//! parser from the `color` crate. Named colors such as `"darkgreen"` and full hex
//! codes such as `"#7B8894"` keep the caller's spelling, since the layout backend
//! reads them directly. Every other CSS form (`rgb(...)`, `hsl(...)`, `#f00`) is
//! normalized to `#rrggbb`, or `#rrggbbaa` when not fully opaque.

use std::{fmt, str::FromStr};

use color::{DynamicColor, Srgb};
use serde::Deserialize;

use crate::error::ValueError;

/// A validated color, displayed in a spelling the layout backend understands.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
    spelling: String,
}

impl Color {
    /// Create a new `Color` from a string
    /// This will parse CSS color strings such as "#ff0000", "rgb(255, 0, 0)", "red", etc.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::InvalidColor`] if the string is not a CSS color.
    ///
    /// # Examples
    ///
    /// ```
    /// use archigraph_core::color::Color;
    ///
    /// let purple = Color::new("purple").unwrap();
    /// assert_eq!(purple.as_str(), "purple");
    /// assert_eq!(Color::new("rgb(255, 0, 0)").unwrap().as_str(), "#ff0000");
    /// assert!(Color::new("not-a-color").is_err());
    /// ```
    pub fn new(color_str: &str) -> Result<Self, ValueError> {
        let trimmed = color_str.trim();
        let parsed = DynamicColor::from_str(trimmed).map_err(|err| ValueError::InvalidColor {
            value: color_str.to_string(),
            reason: err.to_string(),
        })?;

        let spelling = if is_backend_spelling(trimmed) {
            trimmed.to_string()
        } else {
            hex_spelling(parsed)
        };
        Ok(Self { spelling })
    }

    /// Returns the color in its backend spelling.
    pub fn as_str(&self) -> &str {
        &self.spelling
    }
}

/// Returns `true` for a color name or a six/eight digit hex code.
fn is_backend_spelling(value: &str) -> bool {
    if let Some(hex) = value.strip_prefix('#') {
        return matches!(hex.len(), 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphabetic())
}

fn hex_spelling(color: DynamicColor) -> String {
    let rgba = color.to_alpha_color::<Srgb>().to_rgba8();
    if rgba.a == u8::MAX {
        format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b)
    } else {
        format!("#{:02x}{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl FromStr for Color {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Color {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spelling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_new() {
        assert!(Color::new("#ff0000").is_ok());
        assert!(Color::new("darkgreen").is_ok());
        assert!(Color::new("not-a-color").is_err());
    }

    #[test]
    fn test_color_keeps_spelling() {
        let color = Color::new(" #7B8894 ").unwrap();
        assert_eq!(color.to_string(), "#7B8894");
    }

    #[test]
    fn test_color_from_str() {
        let color: Color = "olive".parse().unwrap();
        assert_eq!(color.as_str(), "olive");
    }

    #[test]
    fn test_color_normalizes_other_css_forms() {
        assert_eq!(Color::new("rgb(255, 0, 0)").unwrap().as_str(), "#ff0000");
        assert_eq!(Color::new("#f00").unwrap().as_str(), "#ff0000");
        assert_eq!(Color::new("hsl(0, 100%, 50%)").unwrap().as_str(), "#ff0000");
        assert_eq!(Color::new("rgba(0, 0, 255, 0)").unwrap().as_str(), "#0000ff00");
        assert_eq!(Color::new("#7B8894CC").unwrap().as_str(), "#7B8894CC");
    }

    #[test]
    fn test_invalid_color_error() {
        let err = Color::new("purpleish").unwrap_err();
        assert!(matches!(err, ValueError::InvalidColor { ref value, .. } if value == "purpleish"));
    }
}
