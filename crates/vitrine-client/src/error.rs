//! # Client Error Types
//!
//! Error types for API, session and token storage operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Local          │  │   Auth          │  │     Network             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Validation     │  │  Auth (4xx,     │  │  Network (transport)    │ │
//! │  │  Cart (stock,   │  │   server msg)   │  │  Timeout                │ │
//! │  │   select-size)  │  │  NotAuthentic.  │  │  Decode (non-JSON body) │ │
//! │  │                 │  │  SessionExpired │  │  Http (other statuses)  │ │
//! │  │                 │  │  Superseded     │  │  NotFound               │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                              │
//! │  │  Configuration  │  │    Storage      │                              │
//! │  │                 │  │                 │                              │
//! │  │  InvalidConfig  │  │  token file     │                              │
//! │  │  InvalidUrl     │  │  read / write   │                              │
//! │  │  ConfigLoad/Save│  │                 │                              │
//! │  └─────────────────┘  └─────────────────┘                              │
//! │                                                                         │
//! │  Local errors never reach the network. Auth and network errors are    │
//! │  returned to the call site; a failed refresh demotes the session.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use vitrine_core::{CartError, CoreError, ValidationError};

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Client error type covering every failure a front end must render.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Local Errors (no network call was made)
    // =========================================================================
    /// Form input rejected before sending.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Selection cannot go into the cart (select size, stock).
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Other domain error.
    #[error(transparent)]
    Core(CoreError),

    // =========================================================================
    // Auth Errors
    // =========================================================================
    /// The server rejected an auth request; `message` is shown verbatim.
    #[error("{message}")]
    Auth { status: u16, message: String },

    /// The operation needs a signed-in customer.
    #[error("Not signed in")]
    NotAuthenticated,

    /// Access was rejected and the refresh token no longer works.
    #[error("Session expired, please sign in again")]
    SessionExpired,

    /// The session was signed out or replaced while the request was running;
    /// its result was discarded.
    #[error("Session changed while the request was in flight")]
    Superseded,

    // =========================================================================
    // Network Errors
    // =========================================================================
    /// Transport failure (connection refused, DNS, reset).
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// Response body was not the expected JSON.
    #[error("Invalid response from server: {0}")]
    Decode(String),

    /// Requested resource does not exist.
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// Unexpected HTTP status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    // =========================================================================
    // Storage Errors
    // =========================================================================
    /// Token store could not be read or written.
    #[error("Token storage error: {0}")]
    Storage(String),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid client configuration.
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    /// Invalid API URL.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<CoreError> for ClientError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => ClientError::Validation(e),
            CoreError::Cart(e) => ClientError::Cart(e),
            other => ClientError::Core(other),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else if err.is_builder() {
            ClientError::InvalidUrl(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization (for retry logic and rendering)
// =============================================================================

impl ClientError {
    /// Returns true if the request may succeed when repeated unchanged.
    ///
    /// ## Retryable Errors
    /// - Transport failures
    /// - Timeouts
    /// - 5xx responses
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Network(_) | ClientError::Timeout => true,
            ClientError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns true if the customer needs to (re)authenticate or fix
    /// credentials.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            ClientError::Auth { .. }
                | ClientError::NotAuthenticated
                | ClientError::SessionExpired
                | ClientError::Superseded
        )
    }

    /// Returns true if the error was raised locally without a request.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ClientError::Validation(_) | ClientError::Cart(_) | ClientError::Core(_)
        )
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidConfig(_)
                | ClientError::InvalidUrl(_)
                | ClientError::ConfigLoadFailed(_)
                | ClientError::ConfigSaveFailed(_)
        )
    }
}
