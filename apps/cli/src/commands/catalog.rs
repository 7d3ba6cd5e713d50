//! Catalog commands.
//!
//! # Usage
//!
//! ```bash
//! vitrine products list --category watches --min-price 50
//! vitrine products show 2 --size 3 --qty 2
//! ```

use serde_json::json;
use tracing::debug;

use vitrine_client::ClientError;
use vitrine_core::{Cart, Money, ProductFilter};

use super::print_json;
use crate::app::App;

pub async fn list(
    app: &App,
    category: Option<String>,
    min_price: Option<Money>,
    max_price: Option<Money>,
    search: Option<String>,
) -> anyhow::Result<()> {
    let filter = ProductFilter {
        category,
        min_price,
        max_price,
        search,
    };
    let products = app.catalog.list_products(&filter).await?;

    if app.json {
        return print_json(&products);
    }

    if products.is_empty() {
        println!("No products match.");
        return Ok(());
    }
    for product in &products {
        let sizes = if product.has_sizes() {
            let names: Vec<&str> = product
                .active_variants()
                .map(|v| v.size.name.as_str())
                .collect();
            format!("  [{}]", names.join(", "))
        } else {
            String::new()
        };
        println!(
            "{:>5}  {:<32} {:>10}  {}{}",
            product.id, product.name, product.price, product.category, sizes
        );
    }
    Ok(())
}

/// Opens a product, applies the size and quantity, and tries to add it to
/// an empty cart.
pub async fn show(app: &App, id: i64, size: Option<i64>, qty: i64) -> anyhow::Result<()> {
    let mut selection = app.catalog.product_detail(id).await?;

    if let Some(size_id) = size {
        selection.select_size(size_id).map_err(ClientError::from)?;
    }
    selection.set_quantity(qty).map_err(ClientError::from)?;

    let mut cart = Cart::new();
    let added = cart.add_selection(&selection);
    debug!(product_id = id, ok = added.is_ok(), "Checked selection");

    let product = selection.product();
    if app.json {
        print_json(&json!({
            "product": product,
            "sizeId": selection.variant().map(|v| v.size.id),
            "quantity": selection.quantity(),
            "unitPrice": selection.price(),
            "lineTotal": selection.line_total(),
            "available": selection.available(),
            "canAdd": added.as_ref().err().map_or("ok", |e| e.code()),
        }))?;
    } else {
        println!("{} (#{})", product.name, product.id);
        if let Some(description) = &product.description {
            println!("  {}", description);
        }
        println!("  Category:  {}", product.category);
        println!("  Image:     {}", selection.main_image());
        if product.has_sizes() {
            for variant in product.active_variants() {
                let marker = if selection.variant().map(|v| v.variant_id) == Some(variant.variant_id)
                {
                    "*"
                } else {
                    " "
                };
                println!(
                    "  {} size {:<3} {:<6} {:>10}  {} in stock",
                    marker,
                    variant.size.id,
                    variant.size.name,
                    product.price + variant.price_adjustment,
                    variant.stock_quantity
                );
            }
        }
        println!("  Price:     {}", selection.price());
        println!("  Available: {}", selection.available());
        println!(
            "  {} x {} = {}",
            selection.quantity(),
            selection.price(),
            selection.line_total()
        );
    }

    added.map_err(ClientError::from)?;
    if !app.json {
        println!("Can be added to cart (subtotal {}).", cart.subtotal());
    }
    Ok(())
}
