//! # Token Storage
//!
//! Persistence of the session's bearer token pair.
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Token Storage                                   │
//! │                                                                         │
//! │  TokenStore (trait)                                                    │
//! │  ├── MemoryTokenStore   process memory, gone on exit                   │
//! │  └── FileTokenStore     tokens.json in the platform data directory     │
//! │                                                                         │
//! │  tokens.json                                                           │
//! │  {                                                                     │
//! │    "accessToken":  "eyJ...",                                           │
//! │    "refreshToken": "eyJ...",                                           │
//! │    "savedAt":      "2026-10-19T09:30:00Z"                              │
//! │  }                                                                     │
//! │                                                                         │
//! │  Both tokens are written in one operation (temp file + rename), so a  │
//! │  reader never sees a new access token next to an old refresh token.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{ClientConfig, TokenStoreKind};
use crate::error::{ClientError, ClientResult};

/// Storage key of the access token.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Storage key of the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

// =============================================================================
// Token Pair
// =============================================================================

/// Access and refresh tokens issued together by the API.
#[derive(Clone)]
pub struct TokenPair {
    pub access: SecretString,
    pub refresh: SecretString,
}

impl TokenPair {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        TokenPair {
            access: SecretString::from(access.into()),
            refresh: SecretString::from(refresh.into()),
        }
    }

    /// True when both tokens are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.access.expose_secret().is_empty() && !self.refresh.expose_secret().is_empty()
    }

    /// Compares access tokens without exposing either in a log.
    pub fn same_access(&self, other: &TokenPair) -> bool {
        self.access.expose_secret() == other.access.expose_secret()
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"[REDACTED]")
            .field("refresh", &"[REDACTED]")
            .finish()
    }
}

// =============================================================================
// Token Store Trait
// =============================================================================

/// Persistent home of the token pair.
///
/// Implementations are synchronous: each call is a single small read or
/// write, and the session holds no lock across one.
pub trait TokenStore: Send + Sync {
    /// Loads the stored pair, if a complete one exists.
    fn load(&self) -> ClientResult<Option<TokenPair>>;

    /// Replaces both tokens in one write.
    fn save(&self, tokens: &TokenPair) -> ClientResult<()>;

    /// Removes both tokens.
    fn clear(&self) -> ClientResult<()>;
}

/// Opens the token store selected by the configuration.
pub fn open_token_store(config: &ClientConfig) -> ClientResult<Arc<dyn TokenStore>> {
    match config.storage.backend {
        TokenStoreKind::Memory => {
            debug!("Using in-memory token store");
            Ok(Arc::new(MemoryTokenStore::new()))
        }
        TokenStoreKind::File => {
            let path = config.token_path().ok_or_else(|| {
                ClientError::InvalidConfig("No token path available".into())
            })?;
            debug!(?path, "Using file token store");
            Ok(Arc::new(FileTokenStore::new(path)))
        }
    }
}

// =============================================================================
// Memory Store
// =============================================================================

/// Token store kept in process memory.
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<Option<TokenPair>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `tokens`.
    pub fn with_tokens(tokens: TokenPair) -> Self {
        MemoryTokenStore {
            tokens: RwLock::new(Some(tokens)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> ClientResult<Option<TokenPair>> {
        let guard = self
            .tokens
            .read()
            .map_err(|_| ClientError::Storage("token store lock poisoned".into()))?;
        Ok(guard.clone().filter(TokenPair::is_complete))
    }

    fn save(&self, tokens: &TokenPair) -> ClientResult<()> {
        let mut guard = self
            .tokens
            .write()
            .map_err(|_| ClientError::Storage("token store lock poisoned".into()))?;
        *guard = Some(tokens.clone());
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        let mut guard = self
            .tokens
            .write()
            .map_err(|_| ClientError::Storage("token store lock poisoned".into()))?;
        *guard = None;
        Ok(())
    }
}

// =============================================================================
// File Store
// =============================================================================

/// On-disk shape of the token file.
#[derive(Serialize, Deserialize)]
struct TokenFile {
    #[serde(rename = "accessToken")]
    access_token: String,
    #[serde(rename = "refreshToken")]
    refresh_token: String,
    #[serde(rename = "savedAt", default)]
    saved_at: Option<DateTime<Utc>>,
}

/// Token store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileTokenStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> ClientResult<Option<TokenPair>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)?;
        let file: TokenFile = match serde_json::from_str(&contents) {
            Ok(file) => file,
            Err(e) => {
                // An unreadable file means nobody is signed in.
                warn!(path = ?self.path, error = %e, "Ignoring malformed token file");
                return Ok(None);
            }
        };

        let tokens = TokenPair::new(file.access_token, file.refresh_token);
        if !tokens.is_complete() {
            return Ok(None);
        }

        debug!(path = ?self.path, saved_at = ?file.saved_at, "Loaded tokens");
        Ok(Some(tokens))
    }

    fn save(&self, tokens: &TokenPair) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = TokenFile {
            access_token: tokens.access.expose_secret().to_string(),
            refresh_token: tokens.refresh.expose_secret().to_string(),
            saved_at: Some(Utc::now()),
        };
        let contents = serde_json::to_string_pretty(&file)?;

        let temp = self.temp_path();
        std::fs::write(&temp, contents)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&temp, std::fs::Permissions::from_mode(0o600))?;
        }

        std::fs::rename(&temp, &self.path)?;
        debug!(path = ?self.path, "Saved tokens");
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = ?self.path, "Cleared stored tokens");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::Storage(e.to_string())),
        }
    }
}
