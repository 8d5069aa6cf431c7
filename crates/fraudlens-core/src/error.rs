//! Error types for the analysis engine.

use thiserror::Error;

/// Result type alias using `AnalysisError`.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors surfaced by the analysis entry point.
///
/// Detectors never raise: they either fire a signal or stay silent. Only
/// the top-level engine returns an error, and only for invalid input or
/// an unrecoverable internal inconsistency.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The transaction batch was empty.
    #[error("empty transaction batch: nothing to analyze")]
    EmptyInput,

    /// A record violated an input invariant the ingestor should have enforced.
    #[error("input validation failed: {0}")]
    ValidationError(String),

    /// Configuration value out of the accepted range.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Internal inconsistency; indicates a bug, not bad input.
    #[error("internal error: {0}")]
    InternalError(String),
}

impl AnalysisError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        AnalysisError::ValidationError(msg.into())
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        AnalysisError::InternalError(msg.into())
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        AnalysisError::ConfigError(msg.into())
    }

    /// Returns true if the caller can retry with corrected input.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            AnalysisError::EmptyInput | AnalysisError::ValidationError(_)
        )
    }
}
