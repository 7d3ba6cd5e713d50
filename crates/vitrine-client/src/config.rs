//! # Client Configuration
//!
//! Configuration management for the storefront client.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     VITRINE_API_URL=https://shop.example.com/api                       │
//! │     VITRINE_TOKEN_STORE=memory                                         │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/vitrine/vitrine.toml (Linux)                             │
//! │     ~/Library/Application Support/com.vitrine.vitrine/vitrine.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://localhost:8000/api, file token store                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # vitrine.toml
//! [api]
//! base_url = "http://localhost:8000/api"
//! timeout_secs = 30
//! connect_timeout_secs = 10
//!
//! [retry]
//! max_retries = 3
//! initial_backoff_ms = 250
//! max_backoff_secs = 5
//!
//! [storage]
//! backend = "file"  # file | memory
//! token_path = "/home/ana/.local/share/vitrine/tokens.json"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};

/// Base URL of a locally running storefront API.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// File name of the persisted token pair inside the data directory.
pub const TOKEN_FILE_NAME: &str = "tokens.json";

// =============================================================================
// API Settings
// =============================================================================

/// Where and how to reach the storefront API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL; endpoint paths are joined onto it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Connection timeout (seconds).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    concat!("vitrine-client/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

// =============================================================================
// Retry Settings
// =============================================================================

/// Backoff for idempotent catalog requests.
///
/// Auth requests are never retried here; the 401 refresh path has its own
/// retry-once rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Retries after the first attempt. 0 disables retrying.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff duration (milliseconds).
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff duration (seconds).
    #[serde(default = "default_max_backoff")]
    pub max_backoff_secs: u64,
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff() -> u64 {
    250
}

fn default_max_backoff() -> u64 {
    5
}

impl Default for RetrySettings {
    fn default() -> Self {
        RetrySettings {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_secs: default_max_backoff(),
        }
    }
}

// =============================================================================
// Storage Settings
// =============================================================================

/// Token store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStoreKind {
    /// JSON file under the platform data directory.
    #[default]
    File,

    /// Process memory only; the session ends with the process.
    Memory,
}

impl std::fmt::Display for TokenStoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenStoreKind::File => write!(f, "file"),
            TokenStoreKind::Memory => write!(f, "memory"),
        }
    }
}

impl std::str::FromStr for TokenStoreKind {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" | "disk" => Ok(TokenStoreKind::File),
            "memory" | "mem" => Ok(TokenStoreKind::Memory),
            other => Err(ClientError::InvalidConfig(format!(
                "Unknown token store: '{}'. Valid options: file, memory",
                other
            ))),
        }
    }
}

/// Where the session's token pair is persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: TokenStoreKind,

    /// Token file location. Defaults to the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_path: Option<PathBuf>,
}

// =============================================================================
// Client Config
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub retry: RetrySettings,

    #[serde(default)]
    pub storage: StorageSettings,
}

impl ClientConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration for the given API base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.api.base_url = base_url.into();
        config
    }

    /// Loads configuration from file and environment.
    ///
    /// ## Load Order
    /// 1. Start with defaults
    /// 2. Load from TOML file if it exists
    /// 3. Apply environment variable overrides
    /// 4. Validate
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)
                    .map_err(|e| ClientError::ConfigLoadFailed(e.to_string()))?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load client config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Client config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        self.base_url()?;

        if self.api.timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if self.api.connect_timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "connect_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.storage.backend == TokenStoreKind::File && self.token_path().is_none() {
            return Err(ClientError::InvalidConfig(
                "No token_path configured and no data directory available".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("VITRINE_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Ok(timeout) = std::env::var("VITRINE_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(secs) => self.api.timeout_secs = secs,
                Err(_) => warn!(value = %timeout, "Ignoring invalid VITRINE_TIMEOUT_SECS"),
            }
        }

        if let Ok(retries) = std::env::var("VITRINE_MAX_RETRIES") {
            match retries.parse::<u32>() {
                Ok(n) => self.retry.max_retries = n,
                Err(_) => warn!(value = %retries, "Ignoring invalid VITRINE_MAX_RETRIES"),
            }
        }

        if let Ok(store) = std::env::var("VITRINE_TOKEN_STORE") {
            match store.parse() {
                Ok(kind) => {
                    debug!(backend = %store, "Overriding token store from environment");
                    self.storage.backend = kind;
                }
                Err(_) => warn!(backend = %store, "Unknown token store in environment"),
            }
        }

        if let Ok(path) = std::env::var("VITRINE_TOKEN_PATH") {
            self.storage.token_path = Some(PathBuf::from(path));
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "vitrine", "vitrine")
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("vitrine.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Parsed API base URL, always ending in `/` so endpoint paths join
    /// beneath it instead of replacing its last segment.
    pub fn base_url(&self) -> ClientResult<Url> {
        let raw = self.api.base_url.trim();
        let normalized = if raw.ends_with('/') {
            raw.to_string()
        } else {
            format!("{}/", raw)
        };

        let url = Url::parse(&normalized)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ClientError::InvalidUrl(format!(
                "API URL must start with http:// or https://, got: {}",
                raw
            )));
        }
        Ok(url)
    }

    /// Token file path: configured, or `tokens.json` in the data directory.
    pub fn token_path(&self) -> Option<PathBuf> {
        self.storage.token_path.clone().or_else(|| {
            Self::project_dirs().map(|dirs| dirs.data_dir().join(TOKEN_FILE_NAME))
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.api.connect_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_store_kind_parsing() {
        assert_eq!("file".parse::<TokenStoreKind>().unwrap(), TokenStoreKind::File);
        assert_eq!("Memory".parse::<TokenStoreKind>().unwrap(), TokenStoreKind::Memory);
        assert!("redis".parse::<TokenStoreKind>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.api.base_url, DEFAULT_API_URL);
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.storage.backend, TokenStoreKind::File);
    }

    #[test]
    fn test_base_url_normalized() {
        let config = ClientConfig::with_base_url("http://localhost:8000/api");
        let base = config.base_url().unwrap();
        assert_eq!(base.as_str(), "http://localhost:8000/api/");
        assert_eq!(
            base.join("auth/login/").unwrap().as_str(),
            "http://localhost:8000/api/auth/login/"
        );
    }

    #[test]
    fn test_config_validation() {
        let mut config = ClientConfig::with_base_url("http://localhost:8000/api");
        config.storage.backend = TokenStoreKind::Memory;
        assert!(config.validate().is_ok());

        config.api.base_url = "ftp://shop.example.com".to_string();
        assert!(config.validate().unwrap_err().is_config_error());

        config.api.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.api.base_url = DEFAULT_API_URL.to_string();
        config.api.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip_keeps_sections() {
        let mut config = ClientConfig::default();
        config.storage.token_path = Some(PathBuf::from("/tmp/vitrine/tokens.json"));

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[api]"));
        assert!(toml_str.contains("[retry]"));
        assert!(toml_str.contains("[storage]"));

        let parsed: ClientConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.token_path(), config.storage.token_path);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: ClientConfig = toml::from_str(
            r#"
            [api]
            base_url = "https://shop.example.com/api"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.api.timeout_secs, 30);
        assert_eq!(parsed.retry.initial_backoff_ms, 250);
    }
}
