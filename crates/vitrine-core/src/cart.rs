//! # Cart
//!
//! Local shopping cart built from product selections.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Product page action        Method                 Effect               │
//! │  ───────────────────        ──────                 ──────               │
//! │                                                                         │
//! │  ADD TO CART ─────────────► add_selection() ─────► line added/merged   │
//! │                                                                         │
//! │  Change Quantity ─────────► set_quantity() ──────► line.qty = n        │
//! │                                                                         │
//! │  Remove ──────────────────► remove() ────────────► line dropped        │
//! │                                                                         │
//! │  Every add / quantity change re-runs can_add_to_cart with the          │
//! │  COMBINED quantity, so two adds cannot exceed stock together.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CartError;
use crate::money::Money;
use crate::pricing::{can_add_to_cart, effective_price, ProductSelection};
use crate::types::{Product, ProductVariant};
use crate::validation::validate_quantity;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// Identifies a cart line: one product in one size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineKey {
    pub product_id: i64,
    pub variant_id: Option<i64>,
}

impl LineKey {
    pub fn new(product: &Product, variant: Option<&ProductVariant>) -> Self {
        LineKey {
            product_id: product.id,
            variant_id: variant.map(|v| v.variant_id),
        }
    }
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.variant_id {
            Some(variant_id) => write!(f, "{}:{}", self.product_id, variant_id),
            None => write!(f, "{}", self.product_id),
        }
    }
}

/// A line in the cart.
///
/// Name, size label and unit price are frozen when the line is created, so
/// the cart keeps showing what the customer saw even if the catalog changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub key: LineKey,
    pub name: String,
    pub size_label: Option<String>,
    pub unit_price: Money,
    pub quantity: i64,
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by [`LineKey`] (adding the same size merges quantity)
/// - Every line's quantity passed `can_add_to_cart` when it was set
/// - Every line's quantity is within `1..=MAX_ITEM_QUANTITY`
/// - At most [`MAX_CART_ITEMS`] lines
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub lines: Vec<CartLine>,
    pub created_at: DateTime<Utc>,
}

impl Default for Cart {
    fn default() -> Self {
        Cart::new()
    }
}

impl Cart {
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds the product page's current selection.
    pub fn add_selection(&mut self, selection: &ProductSelection) -> Result<(), CartError> {
        self.add_item(selection.product(), selection.variant(), selection.quantity())
    }

    /// Adds `quantity` units, merging with an existing line for the same size.
    ///
    /// `quantity` must be positive; lowering a line goes through
    /// [`Cart::set_quantity`].
    pub fn add_item(
        &mut self,
        product: &Product,
        variant: Option<&ProductVariant>,
        quantity: i64,
    ) -> Result<(), CartError> {
        validate_quantity(quantity)?;
        let key = LineKey::new(product, variant);

        if let Some(line) = self.lines.iter_mut().find(|l| l.key == key) {
            let combined = line
                .quantity
                .checked_add(quantity)
                .unwrap_or(MAX_ITEM_QUANTITY + 1);
            validate_quantity(combined)?;
            can_add_to_cart(product, variant, combined)?;
            line.quantity = combined;
            return Ok(());
        }

        can_add_to_cart(product, variant, quantity)?;

        if self.lines.len() >= MAX_CART_ITEMS {
            return Err(CartError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.lines.push(CartLine {
            key,
            name: product.name.clone(),
            size_label: variant.map(|v| v.size.name.clone()),
            unit_price: effective_price(product, variant),
            quantity,
            added_at: Utc::now(),
        });
        Ok(())
    }

    /// Sets a line's quantity, re-checking stock. Zero removes the line.
    pub fn set_quantity(
        &mut self,
        product: &Product,
        variant: Option<&ProductVariant>,
        quantity: i64,
    ) -> Result<(), CartError> {
        let key = LineKey::new(product, variant);
        if quantity <= 0 {
            return self.remove(key);
        }

        validate_quantity(quantity)?;
        can_add_to_cart(product, variant, quantity)?;

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.key == key)
            .ok_or_else(|| CartError::LineNotFound(key.to_string()))?;
        line.quantity = quantity;
        Ok(())
    }

    pub fn remove(&mut self, key: LineKey) -> Result<(), CartError> {
        let before = self.lines.len();
        self.lines.retain(|l| l.key != key);
        if self.lines.len() == before {
            return Err(CartError::LineNotFound(key.to_string()));
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.created_at = Utc::now();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines.
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProductSize, SizePolicy};

    fn strap() -> Product {
        Product {
            id: 3,
            name: "Leather Strap".to_string(),
            price: Money::from_cents(4000),
            image: "/strap.jpg".to_string(),
            secondary_image: None,
            category: "straps".to_string(),
            description: None,
            images: Vec::new(),
            size_policy: SizePolicy::Multiple,
            stock_quantity: 0,
            variants: vec![
                ProductVariant {
                    variant_id: 30,
                    size: ProductSize {
                        id: 1,
                        name: "S".to_string(),
                    },
                    price_adjustment: Money::zero(),
                    stock_quantity: 2,
                    is_active: true,
                },
                ProductVariant {
                    variant_id: 31,
                    size: ProductSize {
                        id: 2,
                        name: "L".to_string(),
                    },
                    price_adjustment: Money::from_cents(500),
                    stock_quantity: 5,
                    is_active: true,
                },
            ],
        }
    }

    #[test]
    fn test_add_merges_and_checks_combined_stock() {
        let product = strap();
        let small = &product.variants[0];
        let mut cart = Cart::new();

        cart.add_item(&product, Some(small), 1).unwrap();
        cart.add_item(&product, Some(small), 1).unwrap();
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.item_count(), 2);

        let err = cart.add_item(&product, Some(small), 1).unwrap_err();
        assert_eq!(err.code(), "insufficient-stock");
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_sizes_are_separate_lines_with_frozen_price() {
        let product = strap();
        let mut cart = Cart::new();

        cart.add_item(&product, Some(&product.variants[0]), 1).unwrap();
        cart.add_item(&product, Some(&product.variants[1]), 2).unwrap();

        assert_eq!(cart.lines.len(), 2);
        assert_eq!(cart.lines[1].unit_price.cents(), 4500);
        assert_eq!(cart.lines[1].size_label.as_deref(), Some("L"));
        assert_eq!(cart.subtotal().cents(), 4000 + 9000);
    }

    #[test]
    fn test_add_without_size_rejected() {
        let product = strap();
        let mut cart = Cart::new();
        let err = cart.add_item(&product, None, 1).unwrap_err();
        assert_eq!(err.code(), "select-size");
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_and_remove() {
        let product = strap();
        let large = &product.variants[1];
        let mut cart = Cart::new();
        cart.add_item(&product, Some(large), 1).unwrap();

        cart.set_quantity(&product, Some(large), 5).unwrap();
        assert_eq!(cart.item_count(), 5);
        assert!(cart.set_quantity(&product, Some(large), 6).is_err());

        cart.set_quantity(&product, Some(large), 0).unwrap();
        assert!(cart.is_empty());
        assert!(cart
            .remove(LineKey::new(&product, Some(large)))
            .is_err());
    }

    #[test]
    fn test_non_positive_quantities_rejected() {
        let product = strap();
        let large = &product.variants[1];
        let mut cart = Cart::new();

        for quantity in [-5, 0] {
            let err = cart.add_item(&product, Some(large), quantity).unwrap_err();
            assert_eq!(err.code(), "invalid-quantity");
        }
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Money::zero());

        cart.add_item(&product, Some(large), 3).unwrap();
        let err = cart.add_item(&product, Some(large), -3).unwrap_err();
        assert_eq!(err.code(), "invalid-quantity");
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_combined_quantity_is_capped() {
        let mut product = strap();
        product.variants[1].stock_quantity = i64::MAX;
        let large = &product.variants[1];
        let mut cart = Cart::new();

        cart.add_item(&product, Some(large), MAX_ITEM_QUANTITY).unwrap();
        let err = cart.add_item(&product, Some(large), 1).unwrap_err();
        assert!(matches!(err, CartError::InvalidQuantity(_)));
        assert_eq!(cart.item_count(), MAX_ITEM_QUANTITY);

        let err = cart
            .set_quantity(&product, Some(large), MAX_ITEM_QUANTITY + 1)
            .unwrap_err();
        assert_eq!(err.code(), "invalid-quantity");
    }

    #[test]
    fn test_add_selection() {
        let mut selection = ProductSelection::new(strap());
        selection.increase_quantity();

        let mut cart = Cart::new();
        cart.add_selection(&selection).unwrap();
        assert_eq!(cart.lines[0].key.to_string(), "3:30");
        assert_eq!(cart.item_count(), 2);
    }
}
