//! Error types for the NewsFlash toolkit

use thiserror::Error;

/// Result type alias for toolkit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while rendering, sharing, or talking to collaborators
#[derive(Error, Debug)]
pub enum Error {
    /// A logo or article image could not be fetched or decoded
    #[error("Failed to load asset {location}: {reason}")]
    AssetLoad { location: String, reason: String },

    /// Malformed input such as an image locator or an article document
    #[error("Parse error: {0}")]
    Parse(String),

    /// The drawing surface could not be created
    #[error("Rendering failed: {0}")]
    Render(String),

    /// The finished surface could not be encoded
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// Native file sharing was requested on a platform that cannot do it
    #[error("Sharing images is not supported on this device")]
    ShareUnsupported,

    /// The native share surface reported a failure other than cancellation
    #[error("Failed to share image: {0}")]
    Share(String),

    /// Saving an image to local storage failed
    #[error("Failed to save image: {0}")]
    Save(String),

    /// The key-value store rejected a read or write
    #[error("Storage error: {0}")]
    Storage(String),

    /// Network error talking to the news API or push backend
    #[error("Network error: {0}")]
    Network(String),

    /// Push subscription bookkeeping failed
    #[error("Push notification error: {0}")]
    Push(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Underlying I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn asset(location: &str, reason: impl std::fmt::Display) -> Self {
        Error::AssetLoad {
            location: location.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err.to_string())
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}
