//! Error types for traffic computations.

/// Result type for traffic computations
pub type TrafficResult<T> = Result<T, TrafficError>;

/// Error type for traffic computations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrafficError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl TrafficError {
    /// Shorthand for building an [`TrafficError::InvalidArgument`] from any message.
    pub fn invalid(message: impl Into<String>) -> Self {
        TrafficError::InvalidArgument(message.into())
    }
}
