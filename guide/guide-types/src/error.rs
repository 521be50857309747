//! Parameter validation errors.

use thiserror::Error;

/// Result type for parameter validation.
pub type ParamsResult<T> = Result<T, ParamsError>;

/// A guide parameter that cannot be used.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamsError {
    /// Value must be strictly positive.
    #[error("parameter `{name}` must be positive, got {value}")]
    NotPositive {
        /// Parameter path.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// Value must not be negative.
    #[error("parameter `{name}` must not be negative, got {value}")]
    Negative {
        /// Parameter path.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// Value is outside its allowed range.
    #[error("parameter `{name}` must lie in [{min}, {max}], got {value}")]
    OutOfRange {
        /// Parameter path.
        name: &'static str,
        /// Offending value.
        value: f64,
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },

    /// Value is NaN or infinite.
    #[error("parameter `{name}` is not finite")]
    NotFinite {
        /// Parameter path.
        name: &'static str,
    },

    /// Two parameters contradict each other.
    #[error("inconsistent parameters: {details}")]
    Inconsistent {
        /// Description of the conflict.
        details: String,
    },
}
