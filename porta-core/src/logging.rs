//! Logging setup and the client log-sink abstraction.
//!
//! Process-wide logging uses the `tracing` ecosystem. The `ApiClient` in
//! `porta-api` additionally carries an optional per-instance [`LogSink`]
//! behind a runtime gate; [`TracingSink`] bridges that sink onto the global
//! subscriber so client diagnostics and CLI logs share one pipeline.

use std::fmt;

use tracing_subscriber::{fmt as fmt_layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize a console-only tracing subscriber.
///
/// `level` is a filter directive string ("trace", "debug", "info", "warn",
/// "error"); an unparseable value falls back to "info". Subsequent calls are
/// no-ops.
pub fn init_console_logging(level: &str) {
    let env_filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt_layer::layer()
                .with_target(true)
                .compact(),
        )
        .try_init();
}

/// Log severity accepted by a [`LogSink`].
///
/// `Unknown` is the catch-all severity for messages that should be recorded
/// regardless of level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
    Unknown,
}

impl LogLevel {
    /// Lowercase severity name.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
            LogLevel::Unknown => "unknown",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Destination for client diagnostics.
///
/// Implementations must be cheap to call; the client only forwards messages
/// when its logging gate is open.
pub trait LogSink: Send + Sync {
    /// Record one message at the given severity.
    fn log(&self, level: LogLevel, message: &str);
}

/// Sink forwarding every message to the global `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => tracing::debug!("{message}"),
            LogLevel::Info => tracing::info!("{message}"),
            LogLevel::Warning => tracing::warn!("{message}"),
            // Fatal and Unknown have no tracing counterpart; both land on error.
            LogLevel::Error | LogLevel::Fatal | LogLevel::Unknown => {
                tracing::error!("{message}")
            }
        }
    }
}
