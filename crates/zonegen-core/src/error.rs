//! Error types for zone generation
//!
//! Every stage of a run maps its failures onto one variant of [`Error`].
//! None of them are retried: a failed run is simply re-run by the scheduler.

use thiserror::Error;

/// Result type alias for zonegen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for zonegen
#[derive(Error, Debug)]
pub enum Error {
    /// The inventory source was unreachable or answered unsuccessfully.
    /// Raised before any file is touched.
    #[error("Inventory source error: {0}")]
    Inventory(String),

    /// A host record did not fit the expected address/hostname shape.
    /// Raised before any file is written, for either zone.
    #[error("Rendering error: {0}")]
    Render(String),

    /// A snapshot or live zone file could not be read or written
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// The name server reload command failed or exited non-zero
    #[error("Reload error: {0}")]
    Reload(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Another run holds the lock for the same zone directories
    #[error("Run locked: {0}")]
    Locked(String),

    /// I/O errors not attributed to a specific stage
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an inventory source error
    pub fn inventory(msg: impl Into<String>) -> Self {
        Self::Inventory(msg.into())
    }

    /// Create a rendering error
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Create a persistence error
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Create a reload error
    pub fn reload(msg: impl Into<String>) -> Self {
        Self::Reload(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a lock contention error
    pub fn locked(msg: impl Into<String>) -> Self {
        Self::Locked(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
