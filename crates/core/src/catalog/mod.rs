//! The read-only product catalog.
//!
//! A [`Catalog`] is loaded once at start-up, either from the embedded sample
//! data or from a JSON file, and never mutated afterwards. Loading validates
//! the invariants every other module relies on: unique ids, non-negative
//! prices and parseable image URLs.

mod filter;

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::types::{Category, Price, ProductId};

pub use filter::{CatalogQuery, filter_products};

/// Sample catalog shipped with the store.
const SAMPLE_CATALOG_JSON: &str = include_str!("../../data/products.json");

/// Image shown in place of a product image that failed to load.
pub const FALLBACK_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1518709268805-4e9042af2176?w=500&h=400&fit=crop&auto=format";

/// Errors raised while loading or querying the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog data is not valid JSON for a product list.
    #[error("invalid catalog data: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two products share an id.
    #[error("duplicate product id {0}")]
    DuplicateId(ProductId),

    /// A product image reference is not a URL.
    #[error("product {id} has an invalid image URL: {source}")]
    InvalidImage {
        id: ProductId,
        #[source]
        source: url::ParseError,
    },

    /// No product has the requested id.
    #[error("product {0} not found")]
    NotFound(ProductId),
}

/// A product offered in the store. Never mutated after load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub category: Category,
    /// Image URL.
    pub image: String,
    pub description: String,
}

impl Product {
    /// Image to render, given whether loading the product's own image failed.
    #[must_use]
    pub fn display_image(&self, load_failed: bool) -> &str {
        if load_failed {
            FALLBACK_IMAGE_URL
        } else {
            &self.image
        }
    }
}

/// Immutable, ordered product list.
///
/// Cheaply cloneable; clones share the same product records.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Arc<[Product]>,
}

impl Catalog {
    /// Build a catalog, validating every product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateId`] if ids repeat, or
    /// [`CatalogError::InvalidImage`] if an image reference is not a URL.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(products.len());
        for product in &products {
            if !seen.insert(product.id) {
                return Err(CatalogError::DuplicateId(product.id));
            }
            Url::parse(&product.image).map_err(|source| CatalogError::InvalidImage {
                id: product.id,
                source,
            })?;
        }

        Ok(Self {
            products: products.into(),
        })
    }

    /// Parse a catalog from a JSON array of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed (including negative prices
    /// or unknown categories) or fails validation.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let products: Vec<Product> = serde_json::from_str(json)?;
        Self::new(products)
    }

    /// The twelve-product sample catalog.
    ///
    /// # Errors
    ///
    /// Only fails if the embedded data is corrupt.
    pub fn sample() -> Result<Self, CatalogError> {
        Self::from_json(SAMPLE_CATALOG_JSON)
    }

    /// All products in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog holds no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Look up a product by id.
    #[must_use]
    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }

    /// Look up a product by id, treating absence as an error.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if no product has this id.
    pub fn get(&self, id: ProductId) -> Result<&Product, CatalogError> {
        self.find(id).ok_or(CatalogError::NotFound(id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn product(id: i32, image: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Price::from_cents(100),
            category: Category::Tools,
            image: image.to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn test_sample_catalog_loads() {
        let catalog = Catalog::sample().unwrap();
        assert_eq!(catalog.len(), 12);

        let first = &catalog.products()[0];
        assert_eq!(first.id, ProductId::new(1));
        assert_eq!(first.name, "Code Snippet Manager Pro");
        assert_eq!(first.price, Price::from_cents(4999));
        assert_eq!(first.category, Category::Development);
    }

    #[test]
    fn test_find_and_get() {
        let catalog = Catalog::sample().unwrap();
        assert_eq!(
            catalog.find(ProductId::new(8)).map(|p| p.name.as_str()),
            Some("Machine Learning Toolkit")
        );
        assert!(catalog.find(ProductId::new(99)).is_none());
        assert!(matches!(
            catalog.get(ProductId::new(99)),
            Err(CatalogError::NotFound(id)) if id == ProductId::new(99)
        ));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let result = Catalog::new(vec![
            product(1, "https://example.com/a.png"),
            product(1, "https://example.com/b.png"),
        ]);
        assert!(matches!(result, Err(CatalogError::DuplicateId(_))));
    }

    #[test]
    fn test_rejects_invalid_image() {
        let result = Catalog::new(vec![product(1, "not a url")]);
        assert!(matches!(result, Err(CatalogError::InvalidImage { .. })));
    }

    #[test]
    fn test_rejects_negative_price_in_json() {
        let json = r#"[{"id":1,"name":"x","price":"-1.00","category":"Tools",
            "image":"https://example.com/x.png","description":""}]"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn test_rejects_overflowing_price_in_json() {
        let json = r#"[{"id":1,"name":"x","price":"79228162514264337593543950335",
            "category":"Tools","image":"https://example.com/x.png","description":""}]"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn test_display_image_falls_back() {
        let product = product(1, "https://example.com/a.png");
        assert_eq!(product.display_image(false), "https://example.com/a.png");
        assert_eq!(product.display_image(true), FALLBACK_IMAGE_URL);
    }
}
