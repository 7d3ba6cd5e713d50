//! # vitrine-client: Storefront API Client
//!
//! This crate connects the pure storefront logic in `vitrine-core` to the
//! REST API: it owns the customer session and reads the catalog.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Client Architecture                              │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                 Front end (owns Session + Catalog)               │  │
//! │  └───────────────┬──────────────────────────────────┬───────────────┘  │
//! │                  │                                  │                   │
//! │                  ▼                                  ▼                   │
//! │  ┌────────────────────────────┐     ┌────────────────────────────┐     │
//! │  │ Session                    │     │ Catalog                    │     │
//! │  │                            │     │                            │     │
//! │  │ login / register           │     │ list_products(filter)      │     │
//! │  │ current_user (401→refresh) │     │ get_product(id)            │     │
//! │  │ update_profile / logout    │     │ product_detail(id)         │     │
//! │  └──────┬──────────────┬──────┘     └─────────────┬──────────────┘     │
//! │         │              │                          │                     │
//! │         ▼              ▼                          ▼                     │
//! │  ┌─────────────┐  ┌─────────────────────────────────────────────┐      │
//! │  │ TokenStore  │  │ ApiClient (reqwest, backoff for reads)      │      │
//! │  │ memory/file │  └─────────────────────────────────────────────┘      │
//! │  └─────────────┘                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`config`] - Client configuration (API URL, retry, token storage)
//! - [`error`] - Client error types
//! - [`http`] - HTTP wrapper, endpoints and error-body parsing
//! - [`tokens`] - Token pair and token stores
//! - [`session`] - Session manager
//! - [`catalog`] - Product reads
//!
//! ## Usage
//!
//! ```rust,ignore
//! use secrecy::SecretString;
//! use vitrine_client::{ClientConfig, Session};
//!
//! let config = ClientConfig::load_or_default(None);
//! let session = Session::from_config(&config)?;
//!
//! // Resolve whoever was signed in last time
//! if session.restore().await?.is_none() {
//!     let password = SecretString::from("correct horse".to_string());
//!     let user = session.login("ana@example.com", &password).await?;
//!     println!("Welcome, {}", user.display_name());
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod tokens;

// =============================================================================
// Re-exports
// =============================================================================

pub use catalog::Catalog;
pub use config::{ApiSettings, ClientConfig, RetrySettings, StorageSettings, TokenStoreKind};
pub use error::{ClientError, ClientResult};
pub use http::ApiClient;
pub use session::{Session, SessionState};
pub use tokens::{
    open_token_store, FileTokenStore, MemoryTokenStore, TokenPair, TokenStore, ACCESS_TOKEN_KEY,
    REFRESH_TOKEN_KEY,
};
