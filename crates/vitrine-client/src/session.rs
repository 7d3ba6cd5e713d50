//! # Session Manager
//!
//! Owns the customer's token pair and user, and hides access-token expiry
//! behind a single silent refresh.
//!
//! ## Authentication Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Session Authentication Flow                        │
//! │                                                                         │
//! │  ┌────────────────┐     ┌─────────────────┐     ┌─────────────────┐    │
//! │  │  Session       │     │  Storefront API │     │  TokenStore     │    │
//! │  └───────┬────────┘     └────────┬────────┘     └────────┬────────┘    │
//! │          │  1. POST auth/login/  │                       │             │
//! │          │──────────────────────►│                       │             │
//! │          │  2. access + refresh  │                       │             │
//! │          │◄──────────────────────│                       │             │
//! │          │  3. save pair (one write)                     │             │
//! │          │──────────────────────────────────────────────►│             │
//! │          │                       │                       │             │
//! │          │  [Later: access token expired]                │             │
//! │          │                       │                       │             │
//! │          │  4. GET auth/profile/ │                       │             │
//! │          │──────────────────────►│                       │             │
//! │          │  5. 401               │                       │             │
//! │          │◄──────────────────────│                       │             │
//! │          │  6. POST auth/token/refresh/ (single-flight)  │             │
//! │          │──────────────────────►│                       │             │
//! │          │  7. new pair ─────────────────────────────────►│ saved       │
//! │          │  8. GET auth/profile/ (exactly one retry)     │             │
//! │          │──────────────────────►│                       │             │
//! │          │                       │                       │             │
//! │          │  Refresh rejected → clear both tokens, user = None          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## State Machine
//! ```text
//! Unauthenticated ──login/register/restore──► Authenticating ──ok──► Authenticated
//!        ▲                                          │                     │
//!        └──────────────── failure ─────────────────┘                     │
//!        └──────────────── logout / refresh rejected ────────────────────┘
//! ```
//!
//! ## Stale Responses
//! Every operation records the session epoch when it starts. Logout, a
//! rejected refresh and a new login each move the epoch forward; results
//! from an operation whose epoch is no longer current are dropped instead of
//! being written into the session.

use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockWriteGuard};

use reqwest::{Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use vitrine_core::validation::{validate_credentials, validate_profile_update, validate_registration};
use vitrine_core::{ProfileUpdate, RegistrationForm, User};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::http::{
    decode_json, detail_message, endpoints, error_body, error_message, flatten_error_values,
    status_error, ApiClient,
};
use crate::tokens::{open_token_store, TokenPair, TokenStore};

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    email: &'a str,
    username: &'a str,
    password: &'a str,
    password2: &'a str,
    first_name: &'a str,
    last_name: &'a str,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

/// Body of a successful login or registration.
#[derive(Deserialize)]
struct TokenResponse {
    access: String,
    refresh: String,
    #[serde(default)]
    user: Option<User>,
}

/// Body of a successful refresh. Servers without rotation omit `refresh`.
#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
    #[serde(default)]
    refresh: Option<String>,
}

// =============================================================================
// Session State
// =============================================================================

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticating,
    Authenticated,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Unauthenticated => write!(f, "unauthenticated"),
            SessionState::Authenticating => write!(f, "authenticating"),
            SessionState::Authenticated => write!(f, "authenticated"),
        }
    }
}

/// Outcome of a request sent with the stored access token.
enum Authorized {
    Response(Response),
    /// No tokens were stored.
    SignedOut,
    /// The access token was rejected and could not be renewed.
    Expired,
}

/// Marks the session as authenticating for as long as it lives.
struct AuthenticatingGuard<'a>(&'a AtomicUsize);

impl<'a> AuthenticatingGuard<'a> {
    fn new(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        AuthenticatingGuard(counter)
    }
}

impl Drop for AuthenticatingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Session
// =============================================================================

/// The customer session.
///
/// Created once at the application boundary and passed by reference to
/// everything that needs the current user or an authorized request.
///
/// ## Invariants
/// - Tokens are written as a pair or cleared as a pair
/// - At most one refresh is in flight; a 401 causes at most one refresh and
///   one retry
/// - `is_authenticated()` is derived from the user, never stored
pub struct Session {
    api: ApiClient,
    store: Arc<dyn TokenStore>,
    user: RwLock<Option<User>>,
    epoch: AtomicU64,
    authenticating: AtomicUsize,
    refresh_lock: Mutex<()>,
}

impl Session {
    pub fn new(api: ApiClient, store: Arc<dyn TokenStore>) -> Self {
        Session {
            api,
            store,
            user: RwLock::new(None),
            epoch: AtomicU64::new(0),
            authenticating: AtomicUsize::new(0),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Builds the API client and token store described by `config`.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let api = ApiClient::new(config)?;
        let store = open_token_store(config)?;
        Ok(Session::new(api, store))
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    // =========================================================================
    // Derived State
    // =========================================================================

    /// The signed-in customer, if any.
    pub fn user(&self) -> Option<User> {
        self.user
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_some()
    }

    pub fn state(&self) -> SessionState {
        if self.is_authenticated() {
            SessionState::Authenticated
        } else if self.authenticating.load(Ordering::SeqCst) > 0 {
            SessionState::Authenticating
        } else {
            SessionState::Unauthenticated
        }
    }

    /// Current session epoch.
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Loads persisted tokens and resolves the current user.
    ///
    /// Called once at startup. An unreachable API leaves the stored tokens
    /// in place and starts signed out.
    pub async fn restore(&self) -> ClientResult<Option<User>> {
        let _authenticating = AuthenticatingGuard::new(&self.authenticating);

        match self.current_user().await {
            Ok(user) => {
                match &user {
                    Some(u) => info!(user_id = u.id, "Session restored"),
                    None => debug!("No session to restore"),
                }
                Ok(user)
            }
            Err(e) if e.is_retryable() => {
                warn!(error = %e, "API unreachable, starting signed out");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Signs in with email and password.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &SecretString) -> ClientResult<User> {
        validate_credentials(email, password.expose_secret())?;

        let _authenticating = AuthenticatingGuard::new(&self.authenticating);
        let epoch = self.advance_epoch();

        let request = LoginRequest {
            email: email.trim(),
            password: password.expose_secret(),
        };
        let response = self.api.post_json(endpoints::LOGIN, &request, None).await?;

        let status = response.status();
        if status.is_client_error() {
            let message = error_body(response)
                .await
                .and_then(|body| error_message(&body))
                .unwrap_or_else(|| "Login failed".to_string());
            warn!(status = status.as_u16(), "Login rejected");
            return Err(ClientError::Auth {
                status: status.as_u16(),
                message,
            });
        }
        if !status.is_success() {
            return Err(status_error(response).await);
        }

        let tokens: TokenResponse = decode_json(response).await?;
        self.establish(epoch, tokens).await
    }

    /// Creates an account and signs in.
    ///
    /// The form is checked locally first; an invalid form never reaches
    /// the network.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn register(&self, form: &RegistrationForm) -> ClientResult<User> {
        validate_registration(form)?;

        let _authenticating = AuthenticatingGuard::new(&self.authenticating);
        let epoch = self.advance_epoch();

        let email = form.email.trim();
        let request = RegisterRequest {
            email,
            username: email,
            password: &form.password,
            password2: &form.password2,
            first_name: form.first_name.as_deref().unwrap_or(""),
            last_name: form.last_name.as_deref().unwrap_or(""),
        };
        let response = self.api.post_json(endpoints::REGISTER, &request, None).await?;

        let status = response.status();
        if status.is_client_error() {
            let message = error_body(response)
                .await
                .and_then(|body| flatten_error_values(&body))
                .unwrap_or_else(|| "Registration failed".to_string());
            warn!(status = status.as_u16(), "Registration rejected");
            return Err(ClientError::Auth {
                status: status.as_u16(),
                message,
            });
        }
        if !status.is_success() {
            return Err(status_error(response).await);
        }

        let tokens: TokenResponse = decode_json(response).await?;
        self.establish(epoch, tokens).await
    }

    /// Fetches the signed-in customer's profile.
    ///
    /// Returns `Ok(None)` when no tokens are stored or when the access token
    /// was rejected and the refresh failed (both tokens are then cleared).
    /// Transport failures and 5xx responses are errors and keep the tokens.
    pub async fn current_user(&self) -> ClientResult<Option<User>> {
        let epoch = self.epoch();

        let user = match self.fetch_profile(epoch).await? {
            Authorized::Response(response) => {
                let status = response.status();
                if !status.is_success() {
                    return Err(status_error(response).await);
                }
                Some(decode_json::<User>(response).await?)
            }
            Authorized::SignedOut | Authorized::Expired => None,
        };

        if self.commit_user(epoch, user.clone()) {
            Ok(user)
        } else {
            debug!(epoch, "Discarding profile from a previous session");
            Ok(self.user())
        }
    }

    /// Updates profile fields; the server's echoed user replaces the
    /// session user.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<User> {
        validate_profile_update(update)?;

        let epoch = self.epoch();
        let api = &self.api;
        let outcome = self
            .send_authorized(epoch, move |token| async move {
                api.put_json(endpoints::PROFILE, update, Some(&token)).await
            })
            .await?;

        let response = match outcome {
            Authorized::Response(response) => response,
            Authorized::SignedOut => return Err(ClientError::NotAuthenticated),
            Authorized::Expired => return Err(ClientError::SessionExpired),
        };

        let status = response.status();
        if status.is_client_error() {
            let message = error_body(response)
                .await
                .and_then(|body| detail_message(&body))
                .unwrap_or_else(|| "Failed to update profile".to_string());
            return Err(ClientError::Auth {
                status: status.as_u16(),
                message,
            });
        }
        if !status.is_success() {
            return Err(status_error(response).await);
        }

        let user: User = decode_json(response).await?;
        if !self.commit_user(epoch, Some(user.clone())) {
            return Err(ClientError::Superseded);
        }

        info!(user_id = user.id, "Profile updated");
        Ok(user)
    }

    /// Signs out: clears both tokens and the user. No network call.
    pub fn logout(&self) -> ClientResult<()> {
        let mut user = self.lock_user();
        self.epoch.fetch_add(1, Ordering::SeqCst);
        *user = None;
        self.store.clear()?;
        info!("Signed out");
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Stores a fresh token pair and resolves the user it belongs to.
    async fn establish(&self, epoch: u64, response: TokenResponse) -> ClientResult<User> {
        let tokens = TokenPair::new(response.access, response.refresh);
        if !tokens.is_complete() {
            return Err(ClientError::Decode(
                "token response is missing the access or refresh token".into(),
            ));
        }

        if !self.commit_tokens(epoch, &tokens)? {
            return Err(ClientError::Superseded);
        }

        let user = match response.user {
            Some(user) => user,
            None => {
                debug!("Token response carried no user, fetching profile");
                match self.fetch_profile(epoch).await? {
                    Authorized::Response(response) if response.status().is_success() => {
                        decode_json::<User>(response).await?
                    }
                    Authorized::Response(response) if response.status().is_server_error() => {
                        return Err(status_error(response).await);
                    }
                    _ => {
                        self.end_session(epoch)?;
                        return Err(ClientError::Auth {
                            status: StatusCode::UNAUTHORIZED.as_u16(),
                            message: "Failed to fetch user profile".to_string(),
                        });
                    }
                }
            }
        };

        if !self.commit_user(epoch, Some(user.clone())) {
            return Err(ClientError::Superseded);
        }

        info!(user_id = user.id, "Signed in");
        Ok(user)
    }

    async fn fetch_profile(&self, epoch: u64) -> ClientResult<Authorized> {
        let api = &self.api;
        self.send_authorized(epoch, move |token| async move {
            api.get(endpoints::PROFILE, &[], Some(&token)).await
        })
        .await
    }

    /// Sends a request with the stored access token.
    ///
    /// On 401: one refresh (shared with concurrent callers), then exactly
    /// one retry with the new token. A second 401 ends the session.
    async fn send_authorized<F, Fut>(&self, epoch: u64, send: F) -> ClientResult<Authorized>
    where
        F: Fn(SecretString) -> Fut,
        Fut: Future<Output = ClientResult<Response>>,
    {
        let Some(tokens) = self.store.load()? else {
            return Ok(Authorized::SignedOut);
        };

        let response = send(tokens.access.clone()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(Authorized::Response(response));
        }

        debug!("Access token rejected, refreshing");
        let Some(fresh) = self.refresh_rejected(epoch, &tokens).await? else {
            return Ok(Authorized::Expired);
        };

        let retried = send(fresh.access.clone()).await?;
        if retried.status() == StatusCode::UNAUTHORIZED {
            warn!("Request rejected after refresh, ending session");
            self.end_session(epoch)?;
            return Ok(Authorized::Expired);
        }

        Ok(Authorized::Response(retried))
    }

    /// Replaces a rejected access token.
    ///
    /// Returns `None` when the session could not be renewed; the tokens are
    /// cleared in that case unless a newer session already owns them.
    async fn refresh_rejected(
        &self,
        epoch: u64,
        rejected: &TokenPair,
    ) -> ClientResult<Option<TokenPair>> {
        let _single_flight = self.refresh_lock.lock().await;

        let Some(current) = self.store.load()? else {
            return Ok(None);
        };
        if !current.same_access(rejected) {
            debug!("Access token already replaced by a concurrent refresh");
            return Ok(Some(current));
        }

        match self.request_refresh(&current).await {
            Ok(fresh) => {
                if !self.commit_tokens(epoch, &fresh)? {
                    debug!(epoch, "Dropping refreshed tokens from a previous session");
                    return Ok(None);
                }
                info!("Access token refreshed");
                Ok(Some(fresh))
            }
            Err(e) if e.is_auth_error() => {
                warn!(error = %e, "Token refresh rejected, clearing session");
                self.end_session(epoch)?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn request_refresh(&self, current: &TokenPair) -> ClientResult<TokenPair> {
        let request = RefreshRequest {
            refresh: current.refresh.expose_secret(),
        };
        let response = self
            .api
            .post_json(endpoints::TOKEN_REFRESH, &request, None)
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = error_body(response)
                .await
                .and_then(|body| detail_message(&body))
                .unwrap_or_else(|| "Token refresh failed".to_string());
            return Err(ClientError::Auth {
                status: status.as_u16(),
                message,
            });
        }

        let body: RefreshResponse = decode_json(response).await?;
        let refresh = body
            .refresh
            .map(SecretString::from)
            .unwrap_or_else(|| current.refresh.clone());

        let fresh = TokenPair {
            access: SecretString::from(body.access),
            refresh,
        };
        if !fresh.is_complete() {
            return Err(ClientError::Auth {
                status: status.as_u16(),
                message: "Token refresh returned an empty token".to_string(),
            });
        }
        Ok(fresh)
    }

    fn advance_epoch(&self) -> u64 {
        let _user = self.lock_user();
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn lock_user(&self) -> RwLockWriteGuard<'_, Option<User>> {
        self.user
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Sets the user if `epoch` is still current.
    fn commit_user(&self, epoch: u64, user: Option<User>) -> bool {
        let mut guard = self.lock_user();
        if self.epoch() != epoch {
            return false;
        }
        *guard = user;
        true
    }

    /// Saves a token pair if `epoch` is still current.
    fn commit_tokens(&self, epoch: u64, tokens: &TokenPair) -> ClientResult<bool> {
        let _guard = self.lock_user();
        if self.epoch() != epoch {
            return Ok(false);
        }
        self.store.save(tokens)?;
        Ok(true)
    }

    /// Demotes the session after a failed refresh, if `epoch` is still
    /// current.
    fn end_session(&self, epoch: u64) -> ClientResult<()> {
        let mut guard = self.lock_user();
        if self.epoch() != epoch {
            return Ok(());
        }
        self.epoch.fetch_add(1, Ordering::SeqCst);
        *guard = None;
        self.store.clear()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.api.base_url().as_str())
            .field("state", &self.state())
            .field("epoch", &self.epoch())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenStoreKind;
    use crate::tokens::MemoryTokenStore;
    use vitrine_core::ValidationError;

    /// Session pointed at a port nothing listens on; any request fails.
    fn offline_session(store: Arc<dyn TokenStore>) -> Session {
        let mut config = ClientConfig::with_base_url("http://127.0.0.1:9/api");
        config.storage.backend = TokenStoreKind::Memory;
        config.retry.max_retries = 0;
        Session::new(ApiClient::new(&config).unwrap(), store)
    }

    #[tokio::test]
    async fn test_short_password_rejected_locally() {
        let session = offline_session(Arc::new(MemoryTokenStore::new()));
        let form = RegistrationForm {
            email: "ana@example.com".into(),
            password: "abcdef".into(),
            password2: "abcdef".into(),
            ..Default::default()
        };

        let err = session.register(&form).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Validation(ValidationError::TooShort { min: 8, .. })
        ));
        assert_eq!(session.state(), SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_current_user_without_tokens_is_none() {
        let session = offline_session(Arc::new(MemoryTokenStore::new()));
        assert_eq!(session.current_user().await.unwrap(), None);
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_restore_offline_keeps_tokens() {
        let store = Arc::new(MemoryTokenStore::with_tokens(TokenPair::new("a", "r")));
        let session = offline_session(store.clone());

        assert_eq!(session.restore().await.unwrap(), None);
        assert!(store.load().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_profile_requires_session() {
        let session = offline_session(Arc::new(MemoryTokenStore::new()));
        let update = ProfileUpdate {
            first_name: Some("Ana".into()),
            ..Default::default()
        };
        assert!(matches!(
            session.update_profile(&update).await,
            Err(ClientError::NotAuthenticated)
        ));
    }

    #[test]
    fn test_logout_clears_tokens_and_advances_epoch() {
        let store = Arc::new(MemoryTokenStore::with_tokens(TokenPair::new("a", "r")));
        let session = offline_session(store.clone());
        let before = session.epoch();

        session.logout().unwrap();

        assert!(store.load().unwrap().is_none());
        assert!(session.epoch() > before);
        assert_eq!(session.state(), SessionState::Unauthenticated);
    }

    #[test]
    fn test_stale_commit_is_discarded() {
        let session = offline_session(Arc::new(MemoryTokenStore::new()));
        let epoch = session.epoch();
        session.logout().unwrap();

        let user = User {
            id: 1,
            email: "ana@example.com".into(),
            first_name: None,
            last_name: None,
        };
        assert!(!session.commit_user(epoch, Some(user)));
        assert!(session.user().is_none());
    }
}
