//! Error types for mockup composition

use thiserror::Error;

/// Result type alias for mockgen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while composing, enriching or exporting a mockup
#[derive(Error, Debug)]
pub enum Error {
    /// A layout parameter was not a finite number
    #[error("Invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// An uploaded file was not an image
    #[error("Unsupported media type: {0}")]
    UnsupportedMedia(String),

    /// Failed to decode an image payload
    #[error("Image decoding failed: {0}")]
    DecodeError(String),

    /// Failed to rasterize or encode the composition
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Export could not be completed
    #[error("Export failed: {0}")]
    ExportError(String),

    /// The content generator returned something unusable
    #[error("Content generation failed: {0}")]
    GenerationError(String),

    /// Invalid or missing configuration (e.g. no API key)
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Filesystem error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::DecodeError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::GenerationError(format!("Malformed JSON: {}", err))
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::NetworkError(err.to_string())
    }
}
