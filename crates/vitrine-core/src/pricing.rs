//! # Pricing Resolver
//!
//! Size/variant-aware price, stock and add-to-cart eligibility.
//!
//! ## Stock Authority
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Which stock figure counts?                          │
//! │                                                                         │
//! │  size_policy = single                size_policy = multiple             │
//! │  ────────────────────                ──────────────────────             │
//! │  product.stock_quantity              selected variant.stock_quantity    │
//! │  (variants ignored)                  (product.stock_quantity ignored)   │
//! │                                                                         │
//! │  effective price = product.price + variant.price_adjustment (or 0)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Product Page Workflow
//! ```text
//! Product loaded ──► default_variant() ──► ProductSelection
//!                                              │
//!              select_size / +/- quantity ─────┤
//!                                              ▼
//!                         price() · available() · check()
//!                                              │
//!                                   Ok ──► Cart::add_item
//! ```

use crate::error::{CartError, CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Product, ProductVariant, SizePolicy};
use crate::validation::validate_quantity;

// =============================================================================
// Resolver Functions
// =============================================================================

/// Finds the selectable variant for a size identifier.
///
/// Returns `None` when the product has no sizes or no active variant has
/// that size.
pub fn resolve_variant(product: &Product, size_id: i64) -> Option<&ProductVariant> {
    if !product.has_sizes() {
        return None;
    }
    product.active_variants().find(|v| v.size.id == size_id)
}

/// Unit price for the product in the chosen variant.
///
/// ```rust
/// use vitrine_core::pricing::effective_price;
/// # use vitrine_core::{Money, Product, ProductSize, ProductVariant, SizePolicy};
/// # let product: Product = serde_json::from_str(
/// #     r#"{"id": 1, "name": "Strap", "price": "40.00", "size_policy": "multiple"}"#).unwrap();
/// # let variant = ProductVariant {
/// #     variant_id: 1,
/// #     size: ProductSize { id: 1, name: "L".into() },
/// #     price_adjustment: Money::from_cents(550),
/// #     stock_quantity: 2,
/// #     is_active: true,
/// # };
/// assert_eq!(effective_price(&product, Some(&variant)).cents(), 4550);
/// assert_eq!(effective_price(&product, None).cents(), 4000);
/// ```
pub fn effective_price(product: &Product, variant: Option<&ProductVariant>) -> Money {
    product.price + variant.map_or(Money::zero(), |v| v.price_adjustment)
}

/// Units available for the product in the chosen variant.
///
/// Single-size products always report their flat stock. Sized products
/// report the variant's stock, or zero without a usable variant.
pub fn available_stock(product: &Product, variant: Option<&ProductVariant>) -> i64 {
    match product.size_policy {
        SizePolicy::Single => product.stock_quantity,
        SizePolicy::Multiple => variant
            .filter(|v| v.is_active)
            .map_or(0, |v| v.stock_quantity),
    }
}

/// Checks whether `quantity` units of the selection may go into the cart.
///
/// ## Rules (checked in this order)
/// 1. A sized product needs a selected variant → [`CartError::SelectSize`]
/// 2. `quantity` must not exceed available stock → [`CartError::InsufficientStock`]
pub fn can_add_to_cart(
    product: &Product,
    selected: Option<&ProductVariant>,
    quantity: i64,
) -> Result<(), CartError> {
    if product.has_sizes() && selected.is_none() {
        return Err(CartError::SelectSize {
            product: product.name.clone(),
        });
    }

    let available = available_stock(product, selected);
    if quantity > available {
        return Err(CartError::InsufficientStock {
            product: product.name.clone(),
            available,
            requested: quantity,
        });
    }

    Ok(())
}

/// Variant pre-selected when a product page opens.
///
/// First variant with stock; otherwise the first listed one, so the page
/// always has a selection to show even when it is sold out.
pub fn default_variant(product: &Product) -> Option<&ProductVariant> {
    if !product.has_sizes() {
        return None;
    }
    product
        .active_variants()
        .find(|v| v.in_stock())
        .or_else(|| product.active_variants().next())
}

// =============================================================================
// Product Selection
// =============================================================================

/// State of the product detail page: chosen size, quantity and image.
#[derive(Debug, Clone)]
pub struct ProductSelection {
    product: Product,
    size_id: Option<i64>,
    quantity: i64,
    image: Option<String>,
}

impl ProductSelection {
    /// Opens a product with the default size and a quantity of one.
    pub fn new(product: Product) -> Self {
        let size_id = default_variant(&product).map(|v| v.size.id);
        ProductSelection {
            product,
            size_id,
            quantity: 1,
            image: None,
        }
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// The currently selected variant, if any.
    pub fn variant(&self) -> Option<&ProductVariant> {
        self.size_id
            .and_then(|size_id| resolve_variant(&self.product, size_id))
    }

    /// Selects a size by identifier. Unknown sizes keep the current choice.
    pub fn select_size(&mut self, size_id: i64) -> CoreResult<&ProductVariant> {
        if resolve_variant(&self.product, size_id).is_none() {
            return Err(CoreError::SizeNotFound {
                product: self.product.name.clone(),
                size_id,
            });
        }
        self.size_id = Some(size_id);
        self.variant().ok_or(CoreError::SizeNotFound {
            product: self.product.name.clone(),
            size_id,
        })
    }

    /// Clears the size choice.
    pub fn clear_size(&mut self) {
        self.size_id = None;
    }

    pub fn increase_quantity(&mut self) {
        self.quantity = (self.quantity + 1).min(crate::MAX_ITEM_QUANTITY);
    }

    /// Decreases quantity, never below one.
    pub fn decrease_quantity(&mut self) {
        if self.quantity > 1 {
            self.quantity -= 1;
        }
    }

    pub fn set_quantity(&mut self, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;
        self.quantity = quantity;
        Ok(())
    }

    /// Shows a gallery image as the main image. Returns false for URLs not
    /// in the product's gallery.
    pub fn select_image(&mut self, url: &str) -> bool {
        if self.product.gallery().contains(&url) {
            self.image = Some(url.to_string());
            true
        } else {
            false
        }
    }

    /// Main image: the chosen gallery image or the product's primary image.
    pub fn main_image(&self) -> &str {
        self.image.as_deref().unwrap_or(&self.product.image)
    }

    /// Unit price for the current selection.
    pub fn price(&self) -> Money {
        effective_price(&self.product, self.variant())
    }

    /// Line total for the current selection and quantity.
    pub fn line_total(&self) -> Money {
        self.price().multiply_quantity(self.quantity)
    }

    /// Units available for the current selection.
    pub fn available(&self) -> i64 {
        available_stock(&self.product, self.variant())
    }

    /// Add-to-cart eligibility for the current selection and quantity.
    pub fn check(&self) -> Result<(), CartError> {
        can_add_to_cart(&self.product, self.variant(), self.quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProductSize;

    fn variant(variant_id: i64, size_id: i64, adj: i64, stock: i64) -> ProductVariant {
        ProductVariant {
            variant_id,
            size: ProductSize {
                id: size_id,
                name: format!("size-{}", size_id),
            },
            price_adjustment: Money::from_cents(adj),
            stock_quantity: stock,
            is_active: true,
        }
    }

    fn product(policy: SizePolicy, stock: i64, variants: Vec<ProductVariant>) -> Product {
        Product {
            id: 1,
            name: "Seamaster 300".to_string(),
            price: Money::from_cents(420_000),
            image: "/main.jpg".to_string(),
            secondary_image: None,
            category: "watches".to_string(),
            description: None,
            images: Vec::new(),
            size_policy: policy,
            stock_quantity: stock,
            variants,
        }
    }

    #[test]
    fn test_single_policy_stock_ignores_variant() {
        let stray = variant(9, 9, 100, 50);
        let p = product(SizePolicy::Single, 3, vec![stray.clone()]);

        assert_eq!(available_stock(&p, None), 3);
        assert_eq!(available_stock(&p, Some(&stray)), 3);
        assert!(!p.has_sizes());
        assert!(resolve_variant(&p, 9).is_none());
    }

    #[test]
    fn test_multiple_policy_uses_variant_stock() {
        let m = variant(11, 2, 1550, 4);
        let p = product(SizePolicy::Multiple, 99, vec![variant(10, 1, 0, 0), m.clone()]);

        assert_eq!(available_stock(&p, Some(&m)), 4);
        assert_eq!(available_stock(&p, None), 0);
    }

    #[test]
    fn test_effective_price_adds_adjustment_exactly() {
        let p = product(
            SizePolicy::Multiple,
            0,
            vec![variant(10, 1, -2501, 1), variant(11, 2, 1, 1)],
        );
        for v in &p.variants {
            assert_eq!(
                effective_price(&p, Some(v)).cents(),
                p.price.cents() + v.price_adjustment.cents()
            );
        }
        assert_eq!(effective_price(&p, None), p.price);
    }

    #[test]
    fn test_resolve_variant_exact_match() {
        let p = product(
            SizePolicy::Multiple,
            0,
            vec![variant(10, 1, 0, 1), variant(11, 2, 0, 1)],
        );
        assert_eq!(resolve_variant(&p, 2).map(|v| v.variant_id), Some(11));
        assert!(resolve_variant(&p, 3).is_none());
    }

    #[test]
    fn test_inactive_variants_are_not_selectable() {
        let mut hidden = variant(10, 1, 0, 5);
        hidden.is_active = false;
        let p = product(SizePolicy::Multiple, 0, vec![hidden.clone()]);

        assert!(!p.has_sizes());
        assert!(resolve_variant(&p, 1).is_none());
        assert_eq!(available_stock(&p, Some(&hidden)), 0);
    }

    #[test]
    fn test_select_size_required_for_any_quantity() {
        let p = product(SizePolicy::Multiple, 100, vec![variant(10, 1, 0, 100)]);
        for qty in [-1, 0, 1, 5, 1000] {
            assert_eq!(
                can_add_to_cart(&p, None, qty).map_err(|e| e.code()),
                Err("select-size")
            );
        }
    }

    #[test]
    fn test_stock_boundary() {
        let p = product(SizePolicy::Single, 3, Vec::new());
        assert!(can_add_to_cart(&p, None, 1).is_ok());
        assert!(can_add_to_cart(&p, None, 3).is_ok());
        assert_eq!(
            can_add_to_cart(&p, None, 4),
            Err(CartError::InsufficientStock {
                product: "Seamaster 300".to_string(),
                available: 3,
                requested: 4,
            })
        );

        let v = variant(10, 1, 0, 2);
        let sized = product(SizePolicy::Multiple, 50, vec![v.clone()]);
        assert!(can_add_to_cart(&sized, Some(&v), 2).is_ok());
        assert_eq!(
            can_add_to_cart(&sized, Some(&v), 3).map_err(|e| e.code()),
            Err("insufficient-stock")
        );
    }

    #[test]
    fn test_default_variant_prefers_stock() {
        let p = product(
            SizePolicy::Multiple,
            0,
            vec![variant(10, 1, 0, 0), variant(11, 2, 0, 3), variant(12, 3, 0, 9)],
        );
        assert_eq!(default_variant(&p).map(|v| v.variant_id), Some(11));
    }

    #[test]
    fn test_default_variant_falls_back_to_first() {
        let p = product(
            SizePolicy::Multiple,
            0,
            vec![variant(10, 1, 0, 0), variant(11, 2, 0, 0)],
        );
        assert_eq!(default_variant(&p).map(|v| v.variant_id), Some(10));

        let single = product(SizePolicy::Single, 5, Vec::new());
        assert!(default_variant(&single).is_none());
    }

    #[test]
    fn test_selection_flow() {
        let p = product(
            SizePolicy::Multiple,
            0,
            vec![variant(10, 1, 0, 0), variant(11, 2, 1000, 2)],
        );
        let mut selection = ProductSelection::new(p);

        assert_eq!(selection.variant().map(|v| v.variant_id), Some(11));
        assert_eq!(selection.price().cents(), 421_000);
        assert!(selection.check().is_ok());

        selection.increase_quantity();
        selection.increase_quantity();
        assert_eq!(selection.quantity(), 3);
        assert_eq!(selection.check().map_err(|e| e.code()), Err("insufficient-stock"));

        selection.decrease_quantity();
        assert_eq!(selection.line_total().cents(), 842_000);

        assert!(selection.select_size(1).is_ok());
        assert_eq!(selection.available(), 0);
        assert!(selection.select_size(42).is_err());
        assert_eq!(selection.variant().map(|v| v.variant_id), Some(10));

        selection.clear_size();
        assert_eq!(selection.check().map_err(|e| e.code()), Err("select-size"));
    }

    #[test]
    fn test_quantity_never_below_one() {
        let mut selection = ProductSelection::new(product(SizePolicy::Single, 1, Vec::new()));
        selection.decrease_quantity();
        assert_eq!(selection.quantity(), 1);
        assert!(selection.set_quantity(0).is_err());
    }

    #[test]
    fn test_select_image_only_from_gallery() {
        let mut p = product(SizePolicy::Single, 1, Vec::new());
        p.images.push(crate::types::ProductImage {
            image_id: 1,
            image_url: "/back.jpg".to_string(),
            alt_text: None,
            is_primary: false,
            display_order: 0,
        });
        let mut selection = ProductSelection::new(p);

        assert_eq!(selection.main_image(), "/main.jpg");
        assert!(!selection.select_image("/elsewhere.jpg"));
        assert!(selection.select_image("/back.jpg"));
        assert_eq!(selection.main_image(), "/back.jpg");
    }
}
