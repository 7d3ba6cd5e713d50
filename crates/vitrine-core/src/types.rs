//! # Domain Types
//!
//! Wire and domain types shared by the storefront client.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │ ProductVariant  │   │  ProductImage   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  variant_id     │   │  image_id       │       │
//! │  │  price (Money)  │◄──│  size           │   │  image_url      │       │
//! │  │  size_policy    │   │  price_adjust.  │   │  is_primary     │       │
//! │  │  stock_quantity │   │  stock_quantity │   │  display_order  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │ RegistrationForm│   │  ProductFilter  │       │
//! │  │  id, email      │   │  email          │   │  category       │       │
//! │  │  first_name?    │   │  password(2)    │   │  min/max price  │       │
//! │  │  last_name?     │   │  names?         │   │  search         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Naming
//! The product payload uses camelCase (`sizePolicy`, `stockQuantity`); the
//! backend's snake_case spellings are accepted as aliases. User payloads are
//! snake_case (`first_name`).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

/// Image shown when the backend has no images for a product.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.png";

fn default_placeholder_image() -> String {
    PLACEHOLDER_IMAGE.to_string()
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Size Policy
// =============================================================================

/// How stock is tracked for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SizePolicy {
    /// One size; the product's own `stock_quantity` is authoritative.
    #[default]
    Single,
    /// Sold in sizes; each variant carries its own stock.
    Multiple,
}

// =============================================================================
// Product Size & Variant
// =============================================================================

/// A size a product can be sold in (e.g. strap length "M").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductSize {
    /// Size identifier used for selection.
    #[serde(alias = "size_id")]
    pub id: i64,

    /// Display label.
    #[serde(alias = "size_name", alias = "label")]
    pub name: String,
}

/// A size-specific purchasable unit of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    #[serde(alias = "variant_id")]
    pub variant_id: i64,

    pub size: ProductSize,

    /// Price delta applied on top of the product's base price.
    #[serde(alias = "price_adjustment", default)]
    #[ts(type = "number")]
    pub price_adjustment: Money,

    #[serde(alias = "stock_quantity", default)]
    pub stock_quantity: i64,

    #[serde(alias = "is_active", default = "default_true")]
    pub is_active: bool,
}

impl ProductVariant {
    /// True when the variant is active and has units on hand.
    pub fn in_stock(&self) -> bool {
        self.is_active && self.stock_quantity > 0
    }
}

// =============================================================================
// Product Image
// =============================================================================

/// Gallery image, as emitted by the backend serializer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductImage {
    pub image_id: i64,
    pub image_url: String,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub display_order: i32,
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,

    pub name: String,

    /// Base price.
    #[ts(type = "number")]
    pub price: Money,

    /// Primary image URL.
    #[serde(default = "default_placeholder_image")]
    pub image: String,

    /// Secondary image URL (back view), shown on hover in the grid.
    #[serde(alias = "secondary_image", default)]
    pub secondary_image: Option<String>,

    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub images: Vec<ProductImage>,

    #[serde(alias = "size_policy", default)]
    pub size_policy: SizePolicy,

    /// Flat stock; authoritative only for [`SizePolicy::Single`].
    #[serde(alias = "stock_quantity", default)]
    pub stock_quantity: i64,

    /// Per-size variants; authoritative only for [`SizePolicy::Multiple`].
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
}

impl Product {
    /// True when the product must be bought in a specific size.
    ///
    /// A `multiple` product with no active variants has no selectable size,
    /// so it is treated as having none.
    pub fn has_sizes(&self) -> bool {
        self.size_policy == SizePolicy::Multiple && self.active_variants().next().is_some()
    }

    /// Variants a customer may select, in listed order.
    pub fn active_variants(&self) -> impl Iterator<Item = &ProductVariant> {
        let enabled = self.size_policy == SizePolicy::Multiple;
        self.variants
            .iter()
            .filter(move |v| enabled && v.is_active)
    }

    /// Gallery image URLs: primary first, then by `display_order`.
    pub fn gallery(&self) -> Vec<&str> {
        let mut images: Vec<&ProductImage> = self.images.iter().collect();
        images.sort_by_key(|img| (!img.is_primary, img.display_order));
        images.into_iter().map(|img| img.image_url.as_str()).collect()
    }
}

// =============================================================================
// Product Filter
// =============================================================================

/// Query filters for the product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    pub search: Option<String>,
}

impl ProductFilter {
    /// Query parameters in the order and spelling the API expects.
    /// Blank text filters are omitted.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(category) = self.category.as_deref().filter(|c| !c.trim().is_empty()) {
            pairs.push(("category", category.trim().to_string()));
        }
        if let Some(min) = self.min_price {
            pairs.push(("min_price", min.to_decimal_string()));
        }
        if let Some(max) = self.max_price {
            pairs.push(("max_price", max.to_decimal_string()));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("search", search.trim().to_string()));
        }
        pairs
    }
}

// =============================================================================
// User & Account Forms
// =============================================================================

/// An authenticated customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub last_name: Option<String>,
}

impl User {
    /// Name to greet the user with; falls back to the email address.
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            self.email.clone()
        } else {
            parts.join(" ")
        }
    }
}

/// Registration form as typed by the customer.
///
/// Holds plain strings; validate with
/// [`validate_registration`](crate::validation::validate_registration)
/// before anything leaves the process.
#[derive(Clone, Default)]
pub struct RegistrationForm {
    pub email: String,
    pub password: String,
    pub password2: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl std::fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("password2", &"[REDACTED]")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish()
    }
}

/// Editable profile fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub last_name: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.first_name.is_none() && self.last_name.is_none()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn watch_json() -> &'static str {
        r#"{
            "id": 7,
            "name": "Seamaster 300",
            "price": "4200.00",
            "category": "watches",
            "description": "Diver",
            "images": [
                {"image_id": 2, "image_url": "/b.jpg", "is_primary": false, "display_order": 1},
                {"image_id": 1, "image_url": "/a.jpg", "is_primary": true, "display_order": 5}
            ],
            "size_policy": "multiple",
            "variants": [
                {"variant_id": 10, "size": {"id": 1, "name": "S"}, "price_adjustment": "0.00", "stock_quantity": 0, "is_active": true},
                {"variantId": 11, "size": {"id": 2, "name": "M"}, "priceAdjustment": 15.5, "stockQuantity": 4}
            ]
        }"#
    }

    #[test]
    fn test_product_deserializes_mixed_naming() {
        let product: Product = serde_json::from_str(watch_json()).unwrap();
        assert_eq!(product.price.cents(), 420_000);
        assert_eq!(product.size_policy, SizePolicy::Multiple);
        assert_eq!(product.image, PLACEHOLDER_IMAGE);
        assert_eq!(product.variants.len(), 2);
        assert_eq!(product.variants[1].price_adjustment.cents(), 1550);
        assert!(product.variants[1].is_active);
        assert!(product.has_sizes());
    }

    #[test]
    fn test_single_policy_is_default() {
        let product: Product =
            serde_json::from_str(r#"{"id": 1, "name": "Strap", "price": 40}"#).unwrap();
        assert_eq!(product.size_policy, SizePolicy::Single);
        assert_eq!(product.stock_quantity, 0);
        assert!(!product.has_sizes());
    }

    #[test]
    fn test_gallery_orders_primary_first() {
        let product: Product = serde_json::from_str(watch_json()).unwrap();
        assert_eq!(product.gallery(), vec!["/a.jpg", "/b.jpg"]);
    }

    #[test]
    fn test_filter_query_pairs_skip_blank() {
        let filter = ProductFilter {
            category: Some("watches".into()),
            min_price: Some(Money::from_cents(10000)),
            max_price: None,
            search: Some("   ".into()),
        };
        assert_eq!(
            filter.query_pairs(),
            vec![
                ("category", "watches".to_string()),
                ("min_price", "100.00".to_string())
            ]
        );
    }

    #[test]
    fn test_optional_fields_in_bindings() {
        let user = User::decl();
        assert!(user.contains("first_name?: string"), "{}", user);
        assert!(user.contains("last_name?: string"), "{}", user);

        let update = ProfileUpdate::decl();
        assert!(update.contains("email?: string"), "{}", update);
    }

    #[test]
    fn test_user_display_name() {
        let mut user = User {
            id: 1,
            email: "ana@example.com".into(),
            first_name: Some("Ana".into()),
            last_name: Some("".into()),
        };
        assert_eq!(user.display_name(), "Ana");

        user.first_name = None;
        assert_eq!(user.display_name(), "ana@example.com");
    }

    #[test]
    fn test_registration_form_debug_redacts_passwords() {
        let form = RegistrationForm {
            email: "ana@example.com".into(),
            password: "hunter22hunter".into(),
            password2: "hunter22hunter".into(),
            ..Default::default()
        };
        let debug = format!("{:?}", form);
        assert!(!debug.contains("hunter22"));
    }
}
