//! Application-wide constants.

/// Application name.
pub const APP_NAME: &str = "porta-fixtures";

/// Application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default admin portal origin for a local development install.
pub const DEFAULT_PORTAL_ORIGIN: &str = "http://provider-admin.3scale.localhost:3000";

/// Default provider access token for a local development install.
pub const DEFAULT_ACCESS_TOKEN: &str = "secret";

/// Path prefix of the account management API under the portal origin.
pub const ADMIN_API_ROOT: &str = "/admin/api";

/// Environment variable overriding the portal origin.
pub const ENV_ENDPOINT: &str = "API_ENDPOINT";

/// Environment variable overriding the access token.
pub const ENV_ACCESS_TOKEN: &str = "ACCESS_TOKEN";

/// Content type sent with every request body.
pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";
