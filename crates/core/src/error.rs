//! Error types for the handbook agent.
//!
//! This module defines a unified error enum covering every failure category
//! in the application, along with the propagation policy each variant
//! implies: configuration errors are fatal at startup, embedding failures
//! abort the current request, search and generation failures degrade
//! gracefully, and partial index writes are surfaced with the count written.

use thiserror::Error;

/// Unified error type for the handbook agent.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// We never panic in library code — errors must be represented and
/// propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The embedding backend is unreachable or the credential is absent.
    /// Fatal to any retrieval attempt in the current request.
    #[error("Embedding service unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// A batched index write failed partway through. `written` is the number
    /// of entries persisted before the failing batch; remaining batches were
    /// aborted.
    #[error("Index write failed after {written} entries: {message}")]
    IndexWriteFailed { written: usize, message: String },

    /// Vector index errors other than partial writes (open, read, decode)
    #[error("Index error: {0}")]
    Index(String),

    /// The search backend itself is unreachable. Callers downgrade this to
    /// "no results" and continue with the next tier.
    #[error("Search backend unavailable: {0}")]
    SearchUnavailable(String),

    /// LLM generation errors. Per-request soft failure: callers convert the
    /// message into an inline error answer instead of raising.
    #[error("Generation error: {0}")]
    Generation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_write_reports_count() {
        let err = AppError::IndexWriteFailed {
            written: 96,
            message: "payload too large".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("96"));
        assert!(text.contains("payload too large"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: AppError = io.into();
        assert!(matches!(err, AppError::Io(_)));
    }
}
