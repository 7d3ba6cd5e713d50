//! # Error Types
//!
//! Domain-specific error types for vitrine-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vitrine-core errors (this file)                                       │
//! │  ├── CoreError        - General domain errors                          │
//! │  ├── ValidationError  - Form / input validation failures               │
//! │  └── CartError        - Add-to-cart eligibility (select size, stock)   │
//! │                                                                         │
//! │  vitrine-client errors (separate crate)                                │
//! │  └── ClientError      - Auth, network, storage, config failures        │
//! │                                                                         │
//! │  Flow: ValidationError → ClientError → inline message at call site     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product, quantities, field)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The product is not sold in the requested size.
    #[error("{product} is not available in size {size_id}")]
    SizeNotFound { product: String, size_id: i64 },

    /// The product is not eligible to be added to the cart.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Monetary value could not be parsed.
    #[error("Invalid amount '{value}': {reason}")]
    InvalidAmount { value: String, reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Cart Error
// =============================================================================

/// Reasons a product selection cannot go into the cart.
///
/// ## User Workflow
/// ```text
/// Click "ADD TO CART" (qty: 5)
///      │
///      ├── qty < 1 or above the per-line cap? → InvalidQuantity
///      │
///      ├── product has sizes, none selected? → SelectSize
///      │
///      ├── available stock = 3?              → InsufficientStock
///      │
///      └── OK → line added to cart
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The product is sold in sizes and no size is selected.
    #[error("Please select a size for {product}")]
    SelectSize { product: String },

    /// Requested quantity exceeds what is available.
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Line is not present in the cart.
    #[error("Item {0} is not in the cart")]
    LineNotFound(String),

    /// Quantity is not positive or exceeds the per-line cap.
    #[error(transparent)]
    InvalidQuantity(#[from] ValidationError),
}

impl CartError {
    /// Stable machine-readable code, matching the web frontend's
    /// `"select-size" | "insufficient-stock"` strings.
    pub fn code(&self) -> &'static str {
        match self {
            CartError::SelectSize { .. } => "select-size",
            CartError::InsufficientStock { .. } => "insufficient-stock",
            CartError::CartTooLarge { .. } => "cart-too-large",
            CartError::LineNotFound(_) => "line-not-found",
            CartError::InvalidQuantity(_) => "invalid-quantity",
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur before any network call is made; the form stays on screen
/// with the message shown inline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One or more required form fields are blank.
    #[error("Please fill out all fields")]
    MissingFields { fields: Vec<String> },

    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters long")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Password and confirmation differ.
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_error_messages() {
        let err = CartError::InsufficientStock {
            product: "Seamaster 300".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Seamaster 300: available 3, requested 5"
        );
        assert_eq!(err.code(), "insufficient-stock");

        let err = CartError::SelectSize {
            product: "Leather Strap".to_string(),
        };
        assert_eq!(err.code(), "select-size");
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(
            ValidationError::PasswordMismatch.to_string(),
            "Passwords do not match"
        );

        let err = ValidationError::TooShort {
            field: "Password".to_string(),
            min: 8,
        };
        assert_eq!(err.to_string(), "Password must be at least 8 characters long");

        let err = ValidationError::MissingFields {
            fields: vec!["email".to_string()],
        };
        assert_eq!(err.to_string(), "Please fill out all fields");
    }

    #[test]
    fn test_conversions_into_core_error() {
        let core_err: CoreError = ValidationError::PasswordMismatch.into();
        assert!(matches!(core_err, CoreError::Validation(_)));

        let core_err: CoreError = CartError::LineNotFound("1".into()).into();
        assert!(matches!(core_err, CoreError::Cart(_)));
    }
}
