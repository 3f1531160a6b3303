//! Global error types for the porta crates.
//!
//! All error categories across the workspace are unified into a single
//! `PortaError` enum with conversions from underlying library errors.

use thiserror::Error;

/// Convenience type alias for Results using PortaError.
pub type PortaResult<T> = Result<T, PortaError>;

/// Unified error type covering all error categories in the fixture tooling.
#[derive(Error, Debug)]
pub enum PortaError {
    // -- Configuration errors --
    /// Invalid endpoint URL, bad config file, or other setup failure.
    #[error("configuration error: {0}")]
    Config(String),

    // -- Network errors --
    /// Network-level failure during a request (connect, TLS, reset).
    #[error("transport error: {0}")]
    Transport(String),

    /// The request exceeded a transport-level deadline.
    #[error("request timeout: {0}")]
    Timeout(String),

    // -- Body errors --
    /// Response body present but not valid JSON.
    #[error("response decode error: {0}")]
    Decode(String),

    /// Failed to serialize a request payload.
    #[error("serialization error: {0}")]
    Serialization(String),

    // -- File/IO errors --
    /// File system operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for PortaError {
    fn from(e: serde_json::Error) -> Self {
        PortaError::Decode(e.to_string())
    }
}

impl From<toml::de::Error> for PortaError {
    fn from(e: toml::de::Error) -> Self {
        PortaError::Config(e.to_string())
    }
}
