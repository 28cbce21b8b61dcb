//! Type-safe price representation using decimal arithmetic.
//!
//! The backend sends prices as plain JSON numbers with no currency attached;
//! the storefront charges in a single configured currency. Prices and
//! discounts therefore travel as bare decimals on the wire and are wrapped
//! here so that discount arithmetic and rounding happen in one place.

use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A non-negative amount in the store currency's standard unit
/// (rupees, not paise).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price after applying an optional percentage discount.
    ///
    /// A missing or zero discount leaves the price untouched.
    #[must_use]
    pub fn discounted(self, discount: Option<Discount>) -> Self {
        match discount {
            Some(d) if !d.is_zero() => {
                Self(self.0 * (Decimal::ONE - d.percent() / Decimal::ONE_HUNDRED))
            }
            _ => self,
        }
    }

    /// Multiply by a line quantity.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Round to two decimal places, halves away from zero.
    #[must_use]
    pub fn round_cents(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Amount in minor units (paise, cents), after rounding to two places.
    #[must_use]
    pub fn minor_units(self) -> Option<i64> {
        use rust_decimal::prelude::ToPrimitive;
        (self.round_cents().0 * Decimal::ONE_HUNDRED).to_i64()
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Mul<Decimal> for Price {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self {
        Self(self.0 * rhs)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Errors that can occur when constructing a [`Discount`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscountError {
    /// The percentage is outside `0..=100`.
    #[error("discount must be between 0 and 100 percent (got {0})")]
    OutOfRange(Decimal),
}

/// A percentage discount in `0..=100`.
///
/// Values outside the range coming from the backend are clamped on decode;
/// values constructed locally are validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Discount(Decimal);

impl Discount {
    /// Create a validated discount percentage.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::OutOfRange`] if `percent` is negative or
    /// above 100.
    pub fn new(percent: Decimal) -> Result<Self, DiscountError> {
        if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
            return Err(DiscountError::OutOfRange(percent));
        }
        Ok(Self(percent))
    }

    fn clamped(percent: Decimal) -> Self {
        Self(percent.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED))
    }

    /// The percentage value, e.g. `10` for 10% off.
    #[must_use]
    pub const fn percent(&self) -> Decimal {
        self.0
    }

    /// Whether this discount takes nothing off.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Serialize for Discount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Discount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        rust_decimal::serde::float::deserialize(deserializer).map(Self::clamped)
    }
}

/// ISO 4217 currency codes accepted by the payment gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// Display symbol.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::INR => "₹",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// Three-letter code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::INR => "INR",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_discounted_applies_percentage() {
        let price = Price::new(d("100"));
        let discount = Discount::new(d("10")).unwrap();
        assert_eq!(price.discounted(Some(discount)), Price::new(d("90")));
    }

    #[test]
    fn test_discounted_without_discount_is_identity() {
        let price = Price::new(d("49.99"));
        assert_eq!(price.discounted(None), price);
        assert_eq!(price.discounted(Some(Discount::default())), price);
    }

    #[test]
    fn test_round_cents_half_away_from_zero() {
        assert_eq!(Price::new(d("1.005")).round_cents(), Price::new(d("1.01")));
        assert_eq!(Price::new(d("2.344")).round_cents(), Price::new(d("2.34")));
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(Price::new(d("1080")).minor_units(), Some(108_000));
        assert_eq!(Price::new(d("0.015")).minor_units(), Some(2));
    }

    #[test]
    fn test_discount_validation() {
        assert!(Discount::new(d("-1")).is_err());
        assert!(Discount::new(d("100.5")).is_err());
        assert!(Discount::new(d("100")).is_ok());
    }

    #[test]
    fn test_discount_decode_clamps() {
        let clamped: Discount = serde_json::from_str("150").unwrap();
        assert_eq!(clamped.percent(), d("100"));
        let fractional: Discount = serde_json::from_str("12.5").unwrap();
        assert_eq!(fractional.percent(), d("12.5"));
    }

    #[test]
    fn test_price_wire_format_is_a_number() {
        let price: Price = serde_json::from_str("1299").unwrap();
        assert_eq!(price.amount(), d("1299"));
        assert_eq!(serde_json::to_string(&Price::new(d("12.5"))).unwrap(), "12.5");
    }

    #[test]
    fn test_sum() {
        let total: Price = [d("1.5"), d("2.25")].into_iter().map(Price::new).sum();
        assert_eq!(total, Price::new(d("3.75")));
    }
}
