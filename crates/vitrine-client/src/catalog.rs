//! # Catalog Client
//!
//! Product listing and product detail reads.
//!
//! ```text
//! list_products(filter) ──► validate filter ──► GET products/?category&min_price&max_price&search
//! get_product(id)       ──► GET products/{id}/   (404 → NotFound)
//! product_detail(id)    ──► get_product ──► ProductSelection (default size, qty 1)
//! ```
//!
//! Reads are public (no bearer token) and retried with backoff on
//! transient failures.

use tracing::{debug, info};

use vitrine_core::validation::validate_product_filter;
use vitrine_core::{Product, ProductFilter, ProductSelection};

use crate::error::ClientResult;
use crate::http::{endpoints, ApiClient};

/// Read-only access to the product catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    api: ApiClient,
}

impl Catalog {
    pub fn new(api: ApiClient) -> Self {
        Catalog { api }
    }

    /// Lists products matching `filter`.
    pub async fn list_products(&self, filter: &ProductFilter) -> ClientResult<Vec<Product>> {
        validate_product_filter(filter)?;

        let query = filter.query_pairs();
        let products: Vec<Product> = self
            .api
            .get_json_with_retry(endpoints::PRODUCTS, &query, "Product list")
            .await?;

        info!(count = products.len(), filters = query.len(), "Fetched products");
        Ok(products)
    }

    /// Fetches one product.
    pub async fn get_product(&self, id: i64) -> ClientResult<Product> {
        let resource = format!("Product {}", id);
        let product: Product = self
            .api
            .get_json_with_retry(&endpoints::product(id), &[], &resource)
            .await?;

        debug!(
            product_id = product.id,
            variants = product.variants.len(),
            policy = ?product.size_policy,
            "Fetched product"
        );
        Ok(product)
    }

    /// Fetches a product and opens it with the default size selected.
    pub async fn product_detail(&self, id: i64) -> ClientResult<ProductSelection> {
        let product = self.get_product(id).await?;
        Ok(ProductSelection::new(product))
    }
}
