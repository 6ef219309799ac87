use thiserror::Error;

/// Error types for the model crate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Amount range whose lower bound is above its upper bound
    #[error("Invalid amount range: minimum {min} is greater than maximum {max}")]
    InvertedAmountRange { min: String, max: String },

    /// Date range whose start is after its end
    #[error("Invalid date range: start {start} is after end {end}")]
    InvertedDateRange { start: String, end: String },

    /// Sort key that is empty or only a direction prefix
    #[error("Invalid sort key: '{0}'")]
    InvalidOrderBy(String),

    /// Field filter without a field name
    #[error("Field filter requires a field name")]
    EmptyFilterField,

    /// Field filter whose value is blank after trimming
    #[error("Field filter on '{0}' requires a non-empty value")]
    EmptyFilterValue(String),
}

/// Type alias for Result with ModelError
pub type Result<T> = std::result::Result<T, ModelError>;
