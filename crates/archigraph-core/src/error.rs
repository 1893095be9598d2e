//! Errors raised while parsing core value types.

use thiserror::Error;

/// Error returned when a string cannot be converted into one of the core value types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// The value is not one of the accepted spellings for an enumerated type.
    #[error("unsupported {kind} `{value}`, valid values: {expected}")]
    Unsupported {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },

    /// The value is not a color the CSS color parser accepts.
    #[error("invalid color `{value}`: {reason}")]
    InvalidColor { value: String, reason: String },
}

impl ValueError {
    /// Create an [`ValueError::Unsupported`] error.
    pub fn unsupported(
        kind: &'static str,
        value: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        Self::Unsupported {
            kind,
            value: value.into(),
            expected,
        }
    }

    /// Returns the kind of value that failed to parse (e.g. `"output format"`).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unsupported { kind, .. } => kind,
            Self::InvalidColor { .. } => "color",
        }
    }
}
