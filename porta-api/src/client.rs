//! HTTP client for the admin portal account management API.
//!
//! Handles authentication-header construction, JSON request/response
//! marshaling, HTTP verb dispatch, and gated diagnostic logging.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde_json::Value;

use porta_core::config::AdminConfig;
use porta_core::constants;
use porta_core::error::{PortaError, PortaResult};
use porta_core::logging::{LogLevel, LogSink};

/// Blocking JSON client for the admin API.
///
/// One instance owns one reusable HTTP connection pool bound to the
/// configured endpoint. Every verb serializes its payload to a JSON body
/// (the empty object still produces a literal `{}` body, including for GET
/// and DELETE) and decodes the JSON response body; an empty body decodes to
/// the empty object.
///
/// The client performs no error recovery: transport failures and JSON parse
/// failures propagate to the caller unchanged and are never retried. HTTP
/// status codes are not inspected either; any response with an empty or
/// JSON body is returned as-is and callers decide what it means. No request
/// timeout is configured, so the transport default (no overall timeout)
/// applies.
#[derive(Clone)]
pub struct ApiClient {
    inner: Client,
    /// Base endpoint; always ends with `/` so relative paths join under it.
    endpoint: Url,
    /// Precomputed `Bearer <base64(token)>` header value.
    authorization: String,
    logger: Option<Arc<dyn LogSink>>,
    /// Runtime half of the logging gate; shared across clones.
    logs_enabled: Arc<AtomicBool>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("endpoint", &self.endpoint)
            .field("logs_enabled", &self.logs_enabled.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new ApiClient from connection configuration and an optional
    /// log sink.
    ///
    /// Fails only if the endpoint is not a valid base URL or the HTTP client
    /// cannot be built. The access token is taken as-is. Logging starts
    /// enabled exactly when a sink was supplied.
    pub fn new(config: &AdminConfig, logger: Option<Arc<dyn LogSink>>) -> PortaResult<Self> {
        let endpoint = parse_endpoint(&config.endpoint)?;

        let mut builder = Client::builder();
        if config.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let inner = builder
            .build()
            .map_err(|e| PortaError::Config(format!("failed to build HTTP client: {e}")))?;

        let authorization = format!("Bearer {}", BASE64.encode(&config.access_token));
        let logs_enabled = Arc::new(AtomicBool::new(logger.is_some()));

        Ok(Self {
            inner,
            endpoint,
            authorization,
            logger,
            logs_enabled,
        })
    }

    /// Get the base endpoint the client is bound to.
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    // --- HTTP verbs ---

    /// Execute a GET request. Pass the empty object for a bodyless call.
    pub fn get(&self, path: &str, payload: &Value) -> PortaResult<Value> {
        self.send_request(Method::GET, path, payload)
    }

    /// Execute a POST request with a JSON payload.
    pub fn post(&self, path: &str, payload: &Value) -> PortaResult<Value> {
        self.send_request(Method::POST, path, payload)
    }

    /// Execute a PUT request with a JSON payload.
    pub fn put(&self, path: &str, payload: &Value) -> PortaResult<Value> {
        self.send_request(Method::PUT, path, payload)
    }

    /// Execute a PATCH request with a JSON payload.
    pub fn patch(&self, path: &str, payload: &Value) -> PortaResult<Value> {
        self.send_request(Method::PATCH, path, payload)
    }

    /// Execute a DELETE request. Pass the empty object for a bodyless call.
    pub fn delete(&self, path: &str, payload: &Value) -> PortaResult<Value> {
        self.send_request(Method::DELETE, path, payload)
    }

    /// Internal: one uniform request path for every verb.
    fn send_request(&self, method: Method, path: &str, payload: &Value) -> PortaResult<Value> {
        self.log_with(LogLevel::Debug, || format!("{method} {path}"));

        let url = self.url_for(path)?;
        let body = serde_json::to_string(payload)
            .map_err(|e| PortaError::Serialization(e.to_string()))?;

        let response = self
            .inner
            .request(method, url)
            .header(CONTENT_TYPE, constants::CONTENT_TYPE_JSON)
            .header(AUTHORIZATION, self.authorization.as_str())
            .body(body)
            .send()
            .map_err(classify_transport_error)?;

        let text = response.text().map_err(classify_transport_error)?;
        if text.is_empty() {
            return Ok(Value::Object(serde_json::Map::new()));
        }
        serde_json::from_str(&text).map_err(|e| PortaError::Decode(e.to_string()))
    }

    /// Resolve a request path against the base endpoint.
    ///
    /// Relative paths join under the endpoint; absolute paths replace its
    /// path component.
    fn url_for(&self, path: &str) -> PortaResult<Url> {
        self.endpoint
            .join(path)
            .map_err(|e| PortaError::Config(format!("invalid request path `{path}`: {e}")))
    }

    // --- Logging gate ---

    /// Re-enable forwarding to the log sink for subsequent calls.
    pub fn enable_logs(&self) {
        self.logs_enabled.store(true, Ordering::Relaxed);
    }

    /// Stop forwarding to the log sink for subsequent calls.
    pub fn disable_logs(&self) {
        self.logs_enabled.store(false, Ordering::Relaxed);
    }

    /// Current state of the runtime toggle. The gate itself also requires a
    /// sink to be present.
    pub fn logs_enabled(&self) -> bool {
        self.logs_enabled.load(Ordering::Relaxed)
    }

    /// Forward a message to the sink if the gate is open.
    pub fn log(&self, level: LogLevel, message: &str) {
        if let Some(sink) = self.gate() {
            sink.log(level, message);
        }
    }

    /// Like [`ApiClient::log`], but the message is built only when the gate
    /// is open.
    pub fn log_with<F>(&self, level: LogLevel, message: F)
    where
        F: FnOnce() -> String,
    {
        if let Some(sink) = self.gate() {
            sink.log(level, &message());
        }
    }

    /// The sink, iff one is present and logging is enabled.
    fn gate(&self) -> Option<&dyn LogSink> {
        if self.logs_enabled.load(Ordering::Relaxed) {
            self.logger.as_deref()
        } else {
            None
        }
    }
}

/// Parse and normalize the base endpoint.
///
/// A trailing `/` is required for RFC 3986 joins to keep the endpoint's own
/// path segment; it is appended here so callers can configure the endpoint
/// either way.
fn parse_endpoint(endpoint: &str) -> PortaResult<Url> {
    let mut url = Url::parse(endpoint)
        .map_err(|e| PortaError::Config(format!("invalid endpoint URL `{endpoint}`: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(PortaError::Config(format!(
            "invalid endpoint URL `{endpoint}`: not a base URL"
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Classify a reqwest error into a PortaError variant.
fn classify_transport_error(e: reqwest::Error) -> PortaError {
    if e.is_timeout() {
        PortaError::Timeout(e.to_string())
    } else if e.is_connect() {
        PortaError::Transport(format!("connection failed: {e}"))
    } else {
        PortaError::Transport(e.to_string())
    }
}
