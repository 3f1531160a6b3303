//! CLI command implementations.

pub mod check;
pub mod seed;

use std::sync::Arc;

use porta_api::ApiClient;
use porta_core::config::{AdminConfig, AppConfig};
use porta_core::constants;
use porta_core::error::PortaResult;
use porta_core::logging::TracingSink;

/// Connection flags shared by commands.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConnectionOpts {
    /// Admin portal origin (overrides config and API_ENDPOINT).
    #[arg(short, long)]
    pub endpoint: Option<String>,

    /// Provider access token (overrides config and ACCESS_TOKEN).
    #[arg(short = 't', long)]
    pub access_token: Option<String>,

    /// Accept invalid TLS certificates.
    #[arg(long)]
    pub insecure: bool,
}

/// Helper to build an API client from resolved connection settings.
///
/// Logging always flows through the global tracing subscriber; per-request
/// debug lines appear under `--verbose`.
pub fn create_api_client(config: &AppConfig, opts: &ConnectionOpts) -> PortaResult<ApiClient> {
    let endpoint = resolve_endpoint(
        opts.endpoint.as_deref(),
        env_value(constants::ENV_ENDPOINT).as_deref(),
        &config.admin.endpoint,
    );
    let access_token = resolve_access_token(
        opts.access_token.as_deref(),
        env_value(constants::ENV_ACCESS_TOKEN).as_deref(),
        &config.admin.access_token,
    );

    let admin = AdminConfig {
        endpoint,
        access_token,
        accept_invalid_certs: opts.insecure || config.admin.accept_invalid_certs,
    };
    ApiClient::new(&admin, Some(Arc::new(TracingSink)))
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Resolve the admin API endpoint.
///
/// Flags and the environment carry the portal origin, to which the admin API
/// root is appended. A config file supplies the endpoint verbatim. Falls back
/// to the local development portal.
fn resolve_endpoint(flag: Option<&str>, env: Option<&str>, configured: &str) -> String {
    if let Some(origin) = flag.or(env) {
        return format!(
            "{}{}",
            origin.trim_end_matches('/'),
            constants::ADMIN_API_ROOT
        );
    }
    if !configured.is_empty() {
        return configured.to_string();
    }
    format!(
        "{}{}",
        constants::DEFAULT_PORTAL_ORIGIN,
        constants::ADMIN_API_ROOT
    )
}

/// Resolve the access token: flag, then environment, then config file, then
/// the local development default.
fn resolve_access_token(flag: Option<&str>, env: Option<&str>, configured: &str) -> String {
    flag.or(env)
        .map(|v| v.to_string())
        .unwrap_or_else(|| {
            if configured.is_empty() {
                constants::DEFAULT_ACCESS_TOKEN.to_string()
            } else {
                configured.to_string()
            }
        })
}
