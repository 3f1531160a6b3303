//! Porta Core - Foundation types for the fixture tooling.
//!
//! This crate provides the shared foundation used by the other porta crates:
//! - Admin portal connection configuration
//! - The unified error type
//! - Logging setup and the client log-sink abstraction
//! - Common constants

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;

// Re-export commonly used items at the crate root
pub use config::AppConfig;
pub use error::{PortaError, PortaResult};
pub use logging::{LogLevel, LogSink};
