//! Error types for slide extraction, summarization and retrieval.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur anywhere in the extraction and retrieval pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// The source presentation does not exist.
    #[error("Presentation file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A required external tool or model could not be loaded.
    #[error("Missing dependency: {0}")]
    DependencyMissing(String),

    /// An unsupported mode or out-of-range argument was supplied.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Processing a single slide failed.
    #[error("Failed to extract slide {slide}: {message}")]
    Extraction { slide: usize, message: String },

    /// The embedding or chat provider returned an error.
    #[error("Provider error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Provider {
        /// HTTP status, if the request got that far.
        status: Option<u16>,
        message: String,
        /// Whether repeating the request may succeed.
        retryable: bool,
    },

    /// The caller cancelled the operation.
    #[error("Operation cancelled")]
    Cancelled,

    /// Failed to open or read a file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    Zip(String),

    /// XML parsing error (for PPTX).
    #[error("XML parsing error: {0}")]
    Xml(String),

    /// The package is missing a required part or is otherwise malformed.
    #[error("Invalid or corrupted file: {0}")]
    CorruptedFile(String),

    /// Export or JSON encoding failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Build a provider error that is safe to retry.
    pub fn transient(status: Option<u16>, message: impl Into<String>) -> Self {
        Error::Provider {
            status,
            message: message.into(),
            retryable: true,
        }
    }

    /// Build a provider error that must not be retried.
    pub fn permanent(status: Option<u16>, message: impl Into<String>) -> Self {
        Error::Provider {
            status,
            message: message.into(),
            retryable: false,
        }
    }

    /// Whether the failed operation may succeed if attempted again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Provider { retryable: true, .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
