//! Error types for the staffdiff comparison pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`LoadError`] - boundary loader errors (file reading, encoding, format)
//! - [`EngineError`] - comparison engine errors
//! - [`PipelineError`] - top-level orchestration errors
//! - [`ServerError`] - HTTP server errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Loader Errors
// =============================================================================

/// Errors while loading a tabular input file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Empty file.
    #[error("Input file is empty")]
    Empty,

    /// No headers found.
    #[error("No column headers found in input")]
    NoHeaders,

    /// File extension the loader cannot handle.
    #[error("Unsupported file format '.{extension}'; export the sheet as CSV and retry")]
    UnsupportedFormat { extension: String },
}

// =============================================================================
// Engine Errors
// =============================================================================

/// Errors from the comparison engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No column matched the configured name tokens. Fatal for the run:
    /// without an identity column no matching is possible.
    #[error("No employee-name column found (looked for a header containing {tokens:?})")]
    NameColumnNotFound { tokens: Vec<String> },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by [`crate::engine::compare_files`].
/// It wraps all lower-level errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Loader error.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Engine error.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}

impl PipelineError {
    /// True when the run failed because no name column could be resolved.
    pub fn is_name_column_not_found(&self) -> bool {
        matches!(
            self,
            PipelineError::Engine(EngineError::NameColumnNotFound { .. })
        )
    }
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for loader operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // LoadError -> PipelineError
        let load_err = LoadError::Empty;
        let pipeline_err: PipelineError = load_err.into();
        assert!(pipeline_err.to_string().contains("empty"));

        // EngineError -> PipelineError
        let engine_err = EngineError::NameColumnNotFound {
            tokens: vec!["name".into(), "employee".into()],
        };
        let pipeline_err: PipelineError = engine_err.into();
        assert!(pipeline_err.to_string().contains("employee"));
        assert!(pipeline_err.is_name_column_not_found());
    }

    #[test]
    fn test_unsupported_format_message() {
        let err = LoadError::UnsupportedFormat {
            extension: "xlsx".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains(".xlsx"));
        assert!(msg.contains("CSV"));
    }
}
