//! Type-safe price representation using decimal arithmetic.

use std::iter::Sum;
use std::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A non-negative monetary amount.
///
/// The backend serializes prices as decimal strings (e.g., `"5000.00"`),
/// which is what `rust_decimal`'s string representation round-trips.
/// Amounts are in the marketplace's single display currency; there is no
/// multi-currency support.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// The zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of currency units.
    #[must_use]
    pub fn from_major(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply by a line-item quantity.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// True if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_major() {
        assert_eq!(Price::from_major(500).amount(), Decimal::new(500, 0));
        assert_eq!(Price::from_major(0), Price::ZERO);
    }

    #[test]
    fn test_times_and_sum() {
        let lines = [Price::from_major(100).times(2), Price::from_major(50)];
        let total: Price = lines.into_iter().sum();
        assert_eq!(total, Price::from_major(250));
    }

    #[test]
    fn test_display_two_decimal_places() {
        assert_eq!(Price::from_major(640).to_string(), "640.00");
    }

    #[test]
    fn test_serde_decimal_string() {
        // DRF emits decimal strings; rust_decimal parses both forms.
        let price: Price = serde_json::from_str("\"5000.00\"").unwrap();
        assert_eq!(price, Price::from_major(5000));
    }
}
