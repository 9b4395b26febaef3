//! Catalog inspection commands.
//!
//! # Usage
//!
//! ```bash
//! # List every product
//! ds-cli catalog list
//!
//! # Search within a category
//! ds-cli catalog list --search pro --category development
//!
//! # Show one product
//! ds-cli catalog show 8
//! ```

use std::path::Path;

use digital_store_core::catalog::{CatalogQuery, filter_products};
use digital_store_core::{CategoryFilter, Product, ProductId};
use thiserror::Error;

use super::{LoadError, load_catalog};

/// Errors from catalog commands.
#[derive(Debug, Error)]
pub enum CatalogCommandError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Invalid category: {0}. Valid categories: all, development, design, ai, tools")]
    InvalidCategory(String),

    #[error("Invalid product id: {0}")]
    InvalidId(String),

    #[error("No product with id {0}")]
    NotFound(ProductId),
}

/// One listing row: id, category, price, name.
fn row(product: &Product) -> String {
    format!(
        "{:>3}  {:<12} {:>9}  {}",
        product.id.as_i32(),
        product.category.label(),
        product.price.to_string(),
        product.name
    )
}

/// Print the products matching `search` and `category`.
pub fn list(
    catalog_path: Option<&Path>,
    search: Option<&str>,
    category: &str,
) -> Result<(), CatalogCommandError> {
    let catalog = load_catalog(catalog_path)?;
    let category: CategoryFilter = category
        .parse()
        .map_err(|_| CatalogCommandError::InvalidCategory(category.to_owned()))?;
    let query = CatalogQuery::new(search.unwrap_or_default(), category);

    let products = filter_products(&catalog, &query);
    tracing::debug!(matches = products.len(), "Catalog filtered");

    #[allow(clippy::print_stdout)]
    {
        for product in &products {
            println!("{}", row(product));
        }
        println!("{} of {} products", products.len(), catalog.len());
    }
    Ok(())
}

/// Print the details of one product.
pub fn show(catalog_path: Option<&Path>, id: &str) -> Result<(), CatalogCommandError> {
    let catalog = load_catalog(catalog_path)?;
    let id: ProductId = id
        .parse()
        .map_err(|_| CatalogCommandError::InvalidId(id.to_owned()))?;
    let product = catalog.find(id).ok_or(CatalogCommandError::NotFound(id))?;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", product.name);
        println!("  id:       {}", product.id);
        println!("  category: {}", product.category.label());
        println!("  price:    {}", product.price);
        println!("  image:    {}", product.image);
        println!();
        println!("{}", product.description);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use digital_store_core::Catalog;

    use super::*;

    #[test]
    fn test_row_layout() {
        let catalog = Catalog::sample().unwrap();
        let product = catalog.get(ProductId::new(8)).unwrap();
        let line = row(product);
        assert!(line.starts_with("  8  AI"));
        assert!(line.contains("  $149.99  "));
        assert!(line.ends_with(&product.name));
    }

    #[test]
    fn test_invalid_category_rejected() {
        let err = list(None, None, "gardening").unwrap_err();
        assert!(matches!(err, CatalogCommandError::InvalidCategory(c) if c == "gardening"));
    }

    #[test]
    fn test_show_unknown_product() {
        let err = show(None, "99").unwrap_err();
        assert!(matches!(err, CatalogCommandError::NotFound(id) if id == ProductId::new(99)));
    }
}
