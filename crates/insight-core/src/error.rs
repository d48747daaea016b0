use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading, decoding or analysing an image.
#[derive(Debug, Error)]
pub enum InsightError {
    /// The input carried no image data at all.
    #[error("input is empty")]
    EmptyInput,

    /// The declared or detected media type is not accepted.
    #[error("unsupported media type: {mime}")]
    UnsupportedMediaType {
        /// The offending MIME type.
        mime: String,
    },

    /// The bytes could not be decoded as an image.
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// The base64 payload is malformed.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Downloading a remote image failed.
    #[error("failed to fetch remote image: {0}")]
    Fetch(String),

    /// A remote image exceeded the configured download bound.
    #[error("payload exceeds {limit} bytes")]
    PayloadTooLarge {
        /// Maximum accepted size in bytes.
        limit: usize,
    },

    /// A local file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Request metadata is not a JSON object of the expected shape.
    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),

    /// Zero-shot classification was requested without any labels.
    #[error("no labels provided; metadata must contain a non-empty \"labels\" list")]
    NoLabels,

    /// Model weights or tokenizer could not be loaded.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Model inference failed.
    #[error("inference error: {0}")]
    Inference(String),

    /// Re-encoding an image failed.
    #[error("failed to encode image: {0}")]
    Encode(String),
}

impl InsightError {
    /// Returns `true` when the error was caused by the caller's input rather
    /// than by the service itself.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            Self::ModelLoad(_) | Self::Inference(_) | Self::Encode(_) | Self::Io { .. }
        )
    }
}

/// Result type alias for insight operations.
pub type Result<T> = std::result::Result<T, InsightError>;
