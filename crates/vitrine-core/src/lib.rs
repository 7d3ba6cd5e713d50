//! # vitrine-core: Pure Business Logic for the Vitrine Storefront
//!
//! This crate holds the storefront's domain types and rules as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vitrine Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Front ends (CLI, web)                        │   │
//! │  │    Browse ──► Product Detail ──► Cart ──► Account              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    vitrine-client                               │   │
//! │  │    Session (tokens, silent refresh) · Catalog (products)       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ vitrine-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │  Variant  │  │  forms    │  │   │
//! │  │   │   User    │  │  (cents)  │  │  Stock    │  │  filters  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Wire types (Product, ProductVariant, User, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`pricing`] - Variant resolution, effective price, stock, eligibility
//! - [`cart`] - Local cart built from product selections
//! - [`validation`] - Client-side form checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use vitrine_core::pricing::{can_add_to_cart, ProductSelection};
//! use vitrine_core::Product;
//!
//! let product: Product = serde_json::from_str(
//!     r#"{"id": 1, "name": "Field Watch", "price": "129.99", "stockQuantity": 2}"#,
//! ).unwrap();
//!
//! assert!(can_add_to_cart(&product, None, 2).is_ok());
//!
//! let selection = ProductSelection::new(product);
//! assert_eq!(selection.price().to_string(), "$129.99");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, LineKey};
pub use error::{CartError, CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::ProductSelection;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum length of first/last name (backend column width).
pub const MAX_NAME_LENGTH: usize = 150;

/// Maximum length of the catalog search text.
pub const MAX_SEARCH_LENGTH: usize = 100;

/// Maximum lines in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity selectable on the product page.
pub const MAX_ITEM_QUANTITY: i64 = 999;
