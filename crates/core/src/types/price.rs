//! Type-safe price representation using decimal arithmetic.
//!
//! Amounts keep full precision through every calculation. Rounding to cents
//! happens only when a price is presented, via [`Price::rounded`] or
//! `Display`, so subtotal, tax and total never compound rounding error.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of decimal places shown to shoppers.
pub const DISPLAY_DECIMAL_PLACES: u32 = 2;

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),

    /// The amount is above [`Price::MAX`].
    #[error("price cannot exceed {max} (got {amount})")]
    TooLarge { amount: Decimal, max: Decimal },
}

/// A non-negative amount in the store currency (US dollars).
///
/// Unit prices are capped at [`Price::MAX`]. Sums and products saturate at
/// the largest representable decimal instead of overflowing.
///
/// ## Examples
///
/// ```
/// use digital_store_core::Price;
/// use rust_decimal::Decimal;
///
/// let price = Price::new(Decimal::new(4999, 2)).unwrap();
/// assert_eq!(price.to_string(), "$49.99");
/// assert!(Price::new(Decimal::new(-1, 0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest unit price accepted: one billion.
    pub const MAX: Self = Self(Decimal::from_parts(1_000_000_000, 0, 0, false, 0));

    /// Create a new price.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if the amount is below zero and
    /// [`PriceError::TooLarge`] if it is above [`Price::MAX`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        if amount > Self::MAX.0 {
            return Err(PriceError::TooLarge {
                amount,
                max: Self::MAX.0,
            });
        }
        Ok(Self(amount))
    }

    /// Create a price from a whole number of cents.
    #[cfg(test)]
    pub(crate) fn from_cents(cents: u32) -> Self {
        Self(Decimal::new(i64::from(cents), DISPLAY_DECIMAL_PLACES))
    }

    /// The unrounded amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The amount rounded to cents, half away from zero.
    #[must_use]
    pub fn rounded(&self) -> Decimal {
        self.0
            .round_dp_with_strategy(DISPLAY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Multiply by a rate, keeping full precision.
    ///
    /// Rates are expected to be non-negative; a negative product clamps to
    /// zero and an overflowing one saturates.
    #[must_use]
    pub fn scale(&self, rate: Decimal) -> Self {
        Self(
            self.0
                .checked_mul(rate)
                .unwrap_or(Decimal::MAX)
                .max(Decimal::ZERO),
        )
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.rounded())
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.checked_add(rhs.0).unwrap_or(Decimal::MAX))
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self::Output {
        Self(
            self.0
                .checked_mul(Decimal::from(quantity))
                .unwrap_or(Decimal::MAX),
        )
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_negative() {
        assert!(matches!(
            Price::new(Decimal::new(-1, 2)),
            Err(PriceError::Negative(_))
        ));
        assert!(Price::new(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_rejects_above_max() {
        assert!(Price::new(Price::MAX.amount()).is_ok());
        assert!(matches!(
            Price::new(Price::MAX.amount() + Decimal::new(1, 2)),
            Err(PriceError::TooLarge { .. })
        ));
        assert!(serde_json::from_str::<Price>("\"79228162514264337593543950335\"").is_err());
    }

    #[test]
    fn test_arithmetic_saturates() {
        let huge = Price(Decimal::MAX);
        assert_eq!((huge * 2).amount(), Decimal::MAX);
        assert_eq!((huge + Price::MAX).amount(), Decimal::MAX);
        assert_eq!(huge.scale(Decimal::TWO).amount(), Decimal::MAX);
        assert_eq!([huge, huge, huge].into_iter().sum::<Price>().amount(), Decimal::MAX);
    }

    #[test]
    fn test_display_rounds_half_away_from_zero() {
        let price = Price::new(Decimal::new(12_345, 3)).unwrap();
        assert_eq!(price.to_string(), "$12.35");
        assert_eq!(Price::ZERO.to_string(), "$0.00");
        assert_eq!(Price::from_cents(500).to_string(), "$5.00");
    }

    #[test]
    fn test_arithmetic_keeps_precision() {
        let price = Price::from_cents(4999);
        let tax = (price * 3).scale(Decimal::new(1, 1));
        assert_eq!(tax.amount(), Decimal::new(14_997, 3));
        assert_eq!(tax.rounded(), Decimal::new(1500, 2));
    }

    #[test]
    fn test_deserialize_validates() {
        let price: Price = serde_json::from_str("\"19.99\"").unwrap();
        assert_eq!(price, Price::from_cents(1999));
        assert!(serde_json::from_str::<Price>("\"-5.00\"").is_err());
    }
}
