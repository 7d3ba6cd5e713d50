//! # API Client
//!
//! Thin reqwest wrapper for the storefront REST API.
//!
//! ## Request Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Request Paths                                   │
//! │                                                                         │
//! │  Catalog (idempotent)           Auth / Profile                          │
//! │  ────────────────────           ──────────────                          │
//! │  get_json_with_retry()          get() / post_json() / put_json()        │
//! │    │                              │                                     │
//! │    ├── 2xx → decode JSON          └── raw Response back to Session,    │
//! │    ├── 404 → NotFound                 which owns the 401 → refresh →   │
//! │    └── network / timeout / 5xx        retry-once rule                  │
//! │          → exponential backoff,                                         │
//! │            at most max_retries                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use reqwest::{RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::config::{ClientConfig, RetrySettings};
use crate::error::{ClientError, ClientResult};

// =============================================================================
// Endpoints
// =============================================================================

/// API paths, relative to the configured base URL.
pub mod endpoints {
    pub const PRODUCTS: &str = "products/";
    pub const LOGIN: &str = "auth/login/";
    pub const REGISTER: &str = "auth/register/";
    pub const TOKEN_REFRESH: &str = "auth/token/refresh/";
    pub const PROFILE: &str = "auth/profile/";

    /// Detail path of one product.
    pub fn product(id: i64) -> String {
        format!("products/{}/", id)
    }
}

// =============================================================================
// API Client
// =============================================================================

/// HTTP client bound to one storefront API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    retry: RetrySettings,
}

impl ApiClient {
    /// Builds a client from configuration.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let base = config.base_url()?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(config.api.user_agent.clone())
            .build()
            .map_err(|e| ClientError::InvalidConfig(format!("HTTP client: {}", e)))?;

        debug!(base_url = %base, "API client created");

        Ok(ApiClient {
            http,
            base,
            retry: config.retry.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Absolute URL of an endpoint path.
    pub fn endpoint(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    // =========================================================================
    // Raw Requests
    // =========================================================================

    pub async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
        bearer: Option<&SecretString>,
    ) -> ClientResult<Response> {
        let url = self.endpoint(path)?;
        debug!(method = "GET", %url, "API request");
        let request = self.http.get(url).query(query);
        Self::send(request, bearer).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&SecretString>,
    ) -> ClientResult<Response> {
        let url = self.endpoint(path)?;
        debug!(method = "POST", %url, "API request");
        let request = self.http.post(url).json(body);
        Self::send(request, bearer).await
    }

    pub async fn put_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&SecretString>,
    ) -> ClientResult<Response> {
        let url = self.endpoint(path)?;
        debug!(method = "PUT", %url, "API request");
        let request = self.http.put(url).json(body);
        Self::send(request, bearer).await
    }

    async fn send(request: RequestBuilder, bearer: Option<&SecretString>) -> ClientResult<Response> {
        let request = match bearer {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        };
        let response = request.send().await?;
        debug!(status = response.status().as_u16(), "API response");
        Ok(response)
    }

    // =========================================================================
    // Idempotent Reads
    // =========================================================================

    /// GETs and decodes a resource, retrying transient failures.
    ///
    /// `resource` names the thing being fetched in a `NotFound` error.
    pub async fn get_json_with_retry<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        resource: &str,
    ) -> ClientResult<T> {
        let mut backoff = self.create_backoff();
        let mut attempt = 0u32;

        loop {
            match self.get_json_once(path, query, resource).await {
                Err(e) if e.is_retryable() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    let Some(delay) = backoff.next_backoff() else {
                        return Err(e);
                    };
                    warn!(
                        error = %e,
                        attempt,
                        max_retries = self.retry.max_retries,
                        ?delay,
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                result => return result,
            }
        }
    }

    async fn get_json_once<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        resource: &str,
    ) -> ClientResult<T> {
        let response = self.get(path, query, None).await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound {
                resource: resource.to_string(),
            });
        }
        if !status.is_success() {
            return Err(status_error(response).await);
        }

        decode_json(response).await
    }

    fn create_backoff(&self) -> ExponentialBackoff {
        let initial = Duration::from_millis(self.retry.initial_backoff_ms);
        ExponentialBackoff {
            current_interval: initial,
            initial_interval: initial,
            max_interval: Duration::from_secs(self.retry.max_backoff_secs),
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

// =============================================================================
// Response Helpers
// =============================================================================

/// Decodes a JSON body. A non-JSON body is a `Decode` error.
pub async fn decode_json<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Reads an error body as JSON; `None` for empty or non-JSON bodies.
pub async fn error_body(response: Response) -> Option<Value> {
    let bytes = response.bytes().await.ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Converts an unexpected status into `ClientError::Http`.
pub async fn status_error(response: Response) -> ClientError {
    let status = response.status();
    let message = error_body(response)
        .await
        .and_then(|body| detail_message(&body).or_else(|| error_message(&body)))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());

    ClientError::Http {
        status: status.as_u16(),
        message,
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// The `error` field of an error body (login endpoint shape).
pub fn error_message(body: &Value) -> Option<String> {
    non_empty_str(body.get("error"))
}

/// The `detail` field of an error body (framework default shape).
pub fn detail_message(body: &Value) -> Option<String> {
    non_empty_str(body.get("detail"))
}

/// Every value of a field-error object, flattened one level and joined
/// with spaces in the order the server sent them (registration endpoint
/// shape).
///
/// ```rust
/// use vitrine_client::http::flatten_error_values;
///
/// let body = serde_json::json!({
///     "email": ["user with this email already exists."],
///     "password": ["This password is too common.", "This password is entirely numeric."]
/// });
/// assert_eq!(
///     flatten_error_values(&body).unwrap(),
///     "user with this email already exists. This password is too common. This password is entirely numeric."
/// );
/// ```
pub fn flatten_error_values(body: &Value) -> Option<String> {
    fn render(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    let parts: Vec<String> = match body {
        Value::Object(map) => map
            .values()
            .flat_map(|value| match value {
                Value::Array(items) => items.iter().map(render).collect::<Vec<_>>(),
                other => vec![render(other)],
            })
            .collect(),
        Value::Array(items) => items.iter().map(render).collect(),
        Value::String(s) => vec![s.clone()],
        _ => Vec::new(),
    };

    let joined = parts
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}
