//! Error types for document ingestion and field extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading a source document.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Failed to read the document file.
    #[error("failed to read document {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that abort an extraction run.
///
/// Problems with individual fields are not errors; they become report
/// warnings.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The structured-output client failed.
    #[error("structured extraction client failed: {message}")]
    Client { message: String },

    /// The client answered with something other than a JSON object.
    #[error("extractor output must be a JSON object, got {kind}")]
    InvalidOutput { kind: &'static str },

    /// Failed to read a stored structured output.
    #[error("failed to read extractor output {path}: {source}")]
    OutputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored structured output is not valid JSON.
    #[error("failed to parse extractor output {path}: {source}")]
    OutputParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ExtractError {
    pub fn client(message: impl Into<String>) -> Self {
        Self::Client {
            message: message.into(),
        }
    }
}
