//! Price quotes for a hypothetical cart.
//!
//! # Usage
//!
//! ```bash
//! # One unit of product 1, three of product 9
//! ds-cli quote 1 9x3
//! ```

use std::path::Path;
use std::str::FromStr;

use digital_store_core::{Cart, ProductId};
use thiserror::Error;

use super::{LoadError, load_catalog};

/// Errors from the quote command.
#[derive(Debug, Error)]
pub enum QuoteError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Invalid item {0:?}: expected ID or IDxQUANTITY, e.g. 4x2")]
    InvalidItem(String),

    #[error("No product with id {0}")]
    NotFound(ProductId),
}

/// A quoted product and how many units of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl FromStr for QuoteItem {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || QuoteError::InvalidItem(s.to_owned());
        let (id, quantity) = s.split_once(['x', 'X']).unwrap_or((s, "1"));

        Ok(Self {
            product_id: id.parse().map_err(|_| invalid())?,
            quantity: quantity.trim().parse().map_err(|_| invalid())?,
        })
    }
}

/// Build the cart described by `items`. Repeated products accumulate.
pub fn build_cart(
    catalog: &digital_store_core::Catalog,
    items: &[QuoteItem],
) -> Result<Cart, QuoteError> {
    let mut cart = Cart::new();
    for item in items {
        let product = catalog
            .find(item.product_id)
            .ok_or(QuoteError::NotFound(item.product_id))?;
        if item.quantity == 0 {
            continue;
        }
        // Quantities saturate at u32::MAX.
        let added = cart.add(product);
        cart.set_quantity(product.id, i64::from(added) - 1 + i64::from(item.quantity));
    }
    Ok(cart)
}

/// Print line totals and the order summary for `items`.
pub fn run(catalog_path: Option<&Path>, items: &[QuoteItem]) -> Result<(), QuoteError> {
    let catalog = load_catalog(catalog_path)?;
    let cart = build_cart(&catalog, items)?;
    let totals = cart.totals();

    #[allow(clippy::print_stdout)]
    {
        for line in cart.lines() {
            println!(
                "{:>3} x {:<40} {:>10}",
                line.quantity(),
                line.product().name,
                line.line_total().to_string()
            );
        }
        println!("{:>56}", format!("Subtotal {}", totals.subtotal));
        println!("{:>56}", format!("Tax (10%) {}", totals.tax));
        println!("{:>56}", "Shipping Free");
        println!("{:>56}", format!("Total {}", totals.total));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use digital_store_core::Catalog;

    use super::*;

    #[test]
    fn test_parse_quote_item() {
        let item: QuoteItem = "4x2".parse().unwrap();
        assert_eq!(item.product_id, ProductId::new(4));
        assert_eq!(item.quantity, 2);

        let item: QuoteItem = "7".parse().unwrap();
        assert_eq!(item.quantity, 1);

        assert!("x2".parse::<QuoteItem>().is_err());
        assert!("4x".parse::<QuoteItem>().is_err());
        assert!("4x-1".parse::<QuoteItem>().is_err());
    }

    #[test]
    fn test_build_cart_accumulates_repeats() {
        let catalog = Catalog::sample().unwrap();
        let items: Vec<QuoteItem> = ["1", "9x3", "1x2"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();

        let cart = build_cart(&catalog, &items).unwrap();
        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.quantity_of(ProductId::new(1)), Some(3));
        assert_eq!(cart.quantity_of(ProductId::new(9)), Some(3));
        assert_eq!(cart.totals().subtotal.to_string(), "$239.94");
    }

    #[test]
    fn test_zero_quantity_adds_nothing() {
        let catalog = Catalog::sample().unwrap();
        let cart = build_cart(&catalog, &["5x0".parse().unwrap()]).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_huge_quantities_saturate() {
        let catalog = Catalog::sample().unwrap();
        let items: Vec<QuoteItem> = ["3x4294967295", "3x2"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();

        let cart = build_cart(&catalog, &items).unwrap();
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.quantity_of(ProductId::new(3)), Some(u32::MAX));
    }

    #[test]
    fn test_unknown_product() {
        let catalog = Catalog::sample().unwrap();
        let err = build_cart(&catalog, &["42".parse().unwrap()]).unwrap_err();
        assert!(matches!(err, QuoteError::NotFound(id) if id == ProductId::new(42)));
    }
}
