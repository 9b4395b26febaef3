//! Subtotal, tax and total derived from cart contents.
//!
//! Totals are never stored: every call recomputes them from the line items
//! it is given, at full decimal precision. Round only for presentation.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::cart::LineItem;
use crate::types::Price;

/// Flat sales tax rate (10%).
pub const TAX_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Sum of `price × quantity` over all lines.
#[must_use]
pub fn subtotal(lines: &[LineItem]) -> Price {
    lines.iter().map(LineItem::line_total).sum()
}

/// Tax owed on a subtotal.
#[must_use]
pub fn tax(subtotal: Price) -> Price {
    subtotal.scale(TAX_RATE)
}

/// Price summary for a set of line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartTotals {
    pub subtotal: Price,
    pub tax: Price,
    /// Shipping is free on every order.
    pub shipping: Price,
    pub total: Price,
}

impl CartTotals {
    /// Compute totals for `lines`. An empty slice yields all zeros.
    #[must_use]
    pub fn from_lines(lines: &[LineItem]) -> Self {
        let subtotal = subtotal(lines);
        let tax = tax(subtotal);
        let shipping = Price::ZERO;
        Self {
            subtotal,
            tax,
            shipping,
            total: subtotal + tax + shipping,
        }
    }
}

impl Default for CartTotals {
    fn default() -> Self {
        Self::from_lines(&[])
    }
}
