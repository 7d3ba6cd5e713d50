//! # Validation Module
//!
//! Client-side form checks. Everything here runs before a request is built,
//! so a failing check never touches the network.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: THIS MODULE (client)                                         │
//! │  ├── Required fields, password confirmation, minimum length            │
//! │  └── Immediate inline feedback, no request sent                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Storefront API                                               │
//! │  ├── Uniqueness (email already registered)                             │
//! │  └── Password strength rules                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Errors from layer 2 come back as AuthError with the server message   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{ProductFilter, ProfileUpdate, RegistrationForm};
use crate::{MAX_ITEM_QUANTITY, MAX_NAME_LENGTH, MAX_SEARCH_LENGTH, MIN_PASSWORD_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Account Validators
// =============================================================================

/// Validates an email address.
///
/// Only a shape check (`local@domain.tld`); the server is the authority.
///
/// ```rust
/// use vitrine_core::validation::validate_email;
///
/// assert!(validate_email("ana@example.com").is_ok());
/// assert!(validate_email("ana").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "Email".to_string(),
        });
    }

    let invalid = || ValidationError::InvalidFormat {
        field: "Email".to_string(),
        reason: "expected an address like name@example.com".to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || email.chars().any(char::is_whitespace)
    {
        return Err(invalid());
    }

    Ok(())
}

/// Validates login credentials: both fields must be filled.
pub fn validate_credentials(email: &str, password: &str) -> ValidationResult<()> {
    let mut missing = Vec::new();
    if email.trim().is_empty() {
        missing.push("email".to_string());
    }
    if password.is_empty() {
        missing.push("password".to_string());
    }
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields { fields: missing });
    }
    Ok(())
}

/// Validates a new password and its confirmation.
///
/// ## Rules (checked in this order)
/// 1. Password and confirmation must match
/// 2. Password must have at least [`MIN_PASSWORD_LENGTH`] characters
pub fn validate_new_password(password: &str, confirmation: &str) -> ValidationResult<()> {
    if password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: "Password".to_string(),
            min: MIN_PASSWORD_LENGTH,
        });
    }

    Ok(())
}

/// Validates the registration form.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Register: Submit                                                       │
/// │                                                                         │
/// │  validate_registration(form) ← THIS FUNCTION                           │
/// │       │                                                                 │
/// │       ├── blank field?       → "Please fill out all fields"            │
/// │       ├── password ≠ confirm → "Passwords do not match"                │
/// │       ├── password < 8 chars → "Password must be at least 8 ..."       │
/// │       ├── bad email shape?   → "Email has invalid format"              │
/// │       │                                                                 │
/// │       └── OK → POST /auth/register/                                    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_registration(form: &RegistrationForm) -> ValidationResult<()> {
    let mut missing = Vec::new();
    if form.email.trim().is_empty() {
        missing.push("email".to_string());
    }
    if form.password.trim().is_empty() {
        missing.push("password".to_string());
    }
    if form.password2.trim().is_empty() {
        missing.push("password2".to_string());
    }
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields { fields: missing });
    }

    validate_new_password(&form.password, &form.password2)?;
    validate_email(&form.email)?;
    validate_name("first_name", form.first_name.as_deref())?;
    validate_name("last_name", form.last_name.as_deref())?;

    Ok(())
}

/// Validates a profile update before it is sent.
pub fn validate_profile_update(update: &ProfileUpdate) -> ValidationResult<()> {
    if update.is_empty() {
        return Err(ValidationError::Required {
            field: "At least one profile field".to_string(),
        });
    }
    if let Some(email) = update.email.as_deref() {
        validate_email(email)?;
    }
    validate_name("first_name", update.first_name.as_deref())?;
    validate_name("last_name", update.last_name.as_deref())?;
    Ok(())
}

fn validate_name(field: &str, value: Option<&str>) -> ValidationResult<()> {
    match value {
        Some(name) if name.chars().count() > MAX_NAME_LENGTH => Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// Catalog Validators
// =============================================================================

/// Validates listing filters.
///
/// ## Rules
/// - Prices must be non-negative
/// - `min_price` must not exceed `max_price`
/// - Search text at most [`MAX_SEARCH_LENGTH`] characters
pub fn validate_product_filter(filter: &ProductFilter) -> ValidationResult<()> {
    for (field, price) in [("min_price", filter.min_price), ("max_price", filter.max_price)] {
        if price.is_some_and(|p| p.is_negative()) {
            return Err(ValidationError::OutOfRange {
                field: field.to_string(),
                min: 0,
                max: i64::MAX,
            });
        }
    }

    if let (Some(min), Some(max)) = (filter.min_price, filter.max_price) {
        if min > max {
            return Err(ValidationError::InvalidFormat {
                field: "price range".to_string(),
                reason: format!("minimum {} is above maximum {}", min, max),
            });
        }
    }

    if let Some(search) = filter.search.as_deref() {
        if search.trim().chars().count() > MAX_SEARCH_LENGTH {
            return Err(ValidationError::TooLong {
                field: "search".to_string(),
                max: MAX_SEARCH_LENGTH,
            });
        }
    }

    Ok(())
}

/// Validates a quantity chosen on the product page.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed [`MAX_ITEM_QUANTITY`]
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
