//! Cart line items and the mutations allowed on them.
//!
//! A [`Cart`] holds at most one [`LineItem`] per product id, in first-add
//! order, and every line has a quantity of at least one. The mutations here
//! are the only way to change a cart, so both invariants hold after any
//! sequence of calls.

use serde::Serialize;

use crate::catalog::Product;
use crate::pricing::CartTotals;
use crate::types::{Price, ProductId};

/// One product and its quantity within the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItem {
    product: Product,
    quantity: u32,
}

impl LineItem {
    /// The product on this line.
    #[must_use]
    pub const fn product(&self) -> &Product {
        &self.product
    }

    /// Units of the product; always at least one.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// `price × quantity` for this line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price * self.quantity
    }
}

/// Outcome of [`Cart::set_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityUpdate {
    /// The line now has this quantity.
    Set(u32),
    /// The requested quantity was zero or less, so the line was removed.
    Removed,
    /// The product is not in the cart; nothing changed.
    NotInCart,
}

/// Ordered cart contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Cart {
    lines: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add one unit of `product`, returning the line's new quantity.
    ///
    /// An existing line is incremented; otherwise a line with quantity 1 is
    /// appended.
    pub fn add(&mut self, product: &Product) -> u32 {
        if let Some(line) = self.line_mut(product.id) {
            line.quantity = line.quantity.saturating_add(1);
            return line.quantity;
        }

        self.lines.push(LineItem {
            product: product.clone(),
            quantity: 1,
        });
        1
    }

    /// Remove the line for `id` regardless of its quantity.
    ///
    /// Returns `false` if the product was not in the cart.
    pub fn remove(&mut self, id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.product.id != id);
        self.lines.len() != before
    }

    /// Set the quantity of the line for `id` directly.
    ///
    /// Negative quantities clamp to zero, and zero removes the line. The
    /// line keeps its position when updated.
    pub fn set_quantity(&mut self, id: ProductId, quantity: i64) -> QuantityUpdate {
        let clamped = u32::try_from(quantity.max(0)).unwrap_or(u32::MAX);

        if clamped == 0 {
            return if self.remove(id) {
                QuantityUpdate::Removed
            } else {
                QuantityUpdate::NotInCart
            };
        }

        match self.line_mut(id) {
            Some(line) => {
                line.quantity = clamped;
                QuantityUpdate::Set(clamped)
            }
            None => QuantityUpdate::NotInCart,
        }
    }

    /// Line items in first-add order.
    #[must_use]
    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    /// Number of distinct products (what the cart badge shows).
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Quantity of `id` in the cart, if present.
    #[must_use]
    pub fn quantity_of(&self, id: ProductId) -> Option<u32> {
        self.lines
            .iter()
            .find(|line| line.product.id == id)
            .map(LineItem::quantity)
    }

    /// Whether the cart has a line for `id`.
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.quantity_of(id).is_some()
    }

    /// Totals recomputed from the current lines.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        CartTotals::from_lines(&self.lines)
    }

    fn line_mut(&mut self, id: ProductId) -> Option<&mut LineItem> {
        self.lines.iter_mut().find(|line| line.product.id == id)
    }
}
