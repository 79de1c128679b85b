//! Errors for malformed or out-of-range filter input.

use thiserror::Error;

/// User-correctable filter input error. Never retried; reported as a 400.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidFilter {
    /// A parameter could not be parsed as the expected type.
    #[error("invalid {field}: {reason}")]
    Parameter { field: &'static str, reason: String },

    /// A numeric parameter was NaN or infinite.
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    /// Both bounds of a range were given and the lower one is larger.
    #[error("{field} range is inverted: {min} > {max}")]
    InvertedRange {
        field: &'static str,
        min: String,
        max: String,
    },

    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("radius must be a positive number of meters, got {0}")]
    InvalidRadius(f64),

    /// Parameters that cannot be combined, or a required one is missing.
    #[error("{0}")]
    Conflict(String),
}
