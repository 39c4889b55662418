//! Error types for the assistant.

use std::path::PathBuf;

use asisten_core::CoreError;
use thiserror::Error;

/// Main error type for the assistant library.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A document could not be read.
    #[error("failed to read {}: {source}", path.display())]
    DocumentRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A document is not valid UTF-8 text.
    #[error("{} is not valid UTF-8 text", path.display())]
    DocumentEncoding { path: PathBuf },

    /// A PDF or DOCX file could not be parsed.
    #[error("failed to parse {}: {message}", path.display())]
    DocumentParse { path: PathBuf, message: String },

    /// The document format needs an extractor this build does not ship.
    #[error("unsupported document format '{extension}' for {}. Convert it to .docx or .txt first", path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Model server answered with an error status.
    #[error("model API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// All retry attempts failed.
    #[error("request failed after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },

    /// Model server answered with an unexpected body.
    #[error("failed to parse model response: {0}")]
    ResponseParse(String),

    /// Model returned no text.
    #[error("model returned an empty response")]
    EmptyResponse,

    /// Embedding results do not line up with the inputs.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// JSON serialization failed.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Error from the routing core.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type alias for assistant operations.
pub type Result<T> = std::result::Result<T, AssistantError>;
