// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("File operation failed for {path}: {source}")]
    FileOperation {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to load PDF {path}: {message}")]
    PdfLoad { path: PathBuf, message: String },

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("Table detection error: {0}")]
    TableDetection(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PipelineError {
    /// Errors raised by the storage or embedding layers, which must reach the caller.
    pub fn is_index_failure(&self) -> bool {
        matches!(self, Self::IndexUnavailable(_) | Self::Embedding(_))
    }
}

impl From<lancedb::Error> for PipelineError {
    fn from(err: lancedb::Error) -> Self {
        Self::IndexUnavailable(err.to_string())
    }
}

impl From<arrow_schema::ArrowError> for PipelineError {
    fn from(err: arrow_schema::ArrowError) -> Self {
        Self::IndexUnavailable(format!("arrow: {}", err))
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_failure_classification() {
        assert!(PipelineError::IndexUnavailable("down".into()).is_index_failure());
        assert!(PipelineError::Embedding("timeout".into()).is_index_failure());
        assert!(!PipelineError::Generation("empty".into()).is_index_failure());
    }

    #[test]
    fn test_file_not_found_message() {
        let err = PipelineError::FileNotFound(PathBuf::from("missing.pdf"));
        assert_eq!(err.to_string(), "File not found: missing.pdf");
    }
}
