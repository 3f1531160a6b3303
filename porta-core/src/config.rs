//! Admin portal connection configuration.
//!
//! Configuration is an explicit struct constructed by the caller. The CLI
//! layer resolves command-line flags and environment variables into it;
//! an optional TOML file provides persistent values.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PortaResult;

/// Top-level configuration for the fixture tooling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Admin API connection settings.
    #[serde(default)]
    pub admin: AdminConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Admin API connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Admin API base endpoint, e.g.
    /// "http://provider-admin.3scale.localhost:3000/admin/api".
    #[serde(default)]
    pub endpoint: String,

    /// Provider access token. Opaque; never validated locally.
    #[serde(default)]
    pub access_token: String,

    /// Accept invalid TLS certificates. Only for local portals with
    /// self-signed certificates; verification stays on by default.
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            access_token: String::new(),
            accept_invalid_certs: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> PortaResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Check whether the admin connection is fully configured.
    pub fn is_configured(&self) -> bool {
        !self.admin.endpoint.is_empty() && !self.admin.access_token.is_empty()
    }
}
