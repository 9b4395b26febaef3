//! Orders handed to settlement and the confirmations it produces.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use super::{CheckoutError, CheckoutForm};
use crate::cart::{Cart, LineItem};
use crate::pricing::CartTotals;

/// Why a settlement did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    /// The payment was refused.
    #[error("payment declined: {0}")]
    Declined(String),
    /// The checkout session went away before settlement finished.
    #[error("settlement cancelled")]
    Cancelled,
}

/// Errors that can occur when parsing an [`OrderNumber`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderNumberError {
    #[error("order number must be {expected} characters (got {actual})")]
    Length { expected: usize, actual: usize },
    #[error("order number may only contain 0-9 and A-Z")]
    InvalidCharacter,
}

/// Shopper-facing order reference: nine characters from `0-9A-Z`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Number of characters in an order number.
    pub const LENGTH: usize = 9;

    /// Characters an order number is drawn from.
    pub const ALPHABET: &'static [u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

    /// Parse an order number.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not exactly nine uppercase base-36
    /// characters.
    pub fn parse(s: &str) -> Result<Self, OrderNumberError> {
        if s.len() != Self::LENGTH {
            return Err(OrderNumberError::Length {
                expected: Self::LENGTH,
                actual: s.len(),
            });
        }
        if !s.bytes().all(|b| Self::ALPHABET.contains(&b)) {
            return Err(OrderNumberError::InvalidCharacter);
        }
        Ok(Self(s.to_owned()))
    }

    /// Build an order number from a source of random indices.
    ///
    /// `next_index(n)` is called once per character and should return a
    /// value in `0..n`; out-of-range values wrap.
    pub fn generate(mut next_index: impl FnMut(usize) -> usize) -> Self {
        let alphabet = Self::ALPHABET;
        let number = (0..Self::LENGTH)
            .map(|_| {
                let index = next_index(alphabet.len()) % alphabet.len();
                char::from(alphabet.get(index).copied().unwrap_or(b'0'))
            })
            .collect();
        Self(number)
    }

    /// Returns the order number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What is being paid for, captured from the cart when submit begins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingOrder {
    pub customer_name: String,
    pub email: String,
    pub lines: Vec<LineItem>,
    pub totals: CartTotals,
}

impl PendingOrder {
    /// Snapshot `cart` and the shopper's details.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] if the cart has no lines.
    pub fn capture(cart: &Cart, form: &CheckoutForm) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        Ok(Self {
            customer_name: form.full_name(),
            email: form.email.clone(),
            lines: cart.lines().to_vec(),
            totals: cart.totals(),
        })
    }
}

/// A settled order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderConfirmation {
    pub order_number: OrderNumber,
    pub placed_at: DateTime<Utc>,
    pub order: PendingOrder,
}
