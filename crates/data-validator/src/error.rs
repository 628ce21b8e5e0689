//! Validation Error Types

use thiserror::Error;

/// Errors during record validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// NaN or infinite amount
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    /// Fractional count
    #[error("{field} must be a whole number, got {value}")]
    NotWholeNumber { field: &'static str, value: f64 },

    /// Flag outside {0, 1}
    #[error("{field} must be 0 or 1, got {value}")]
    InvalidFlag { field: &'static str, value: u8 },
}
