//! Non-negative item price using decimal arithmetic.
//!
//! Prices travel as plain JSON numbers (`19.99`) and are stored as
//! `NUMERIC(12, 2)`. Currency is not modelled; the catalog has one implicit
//! currency.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// Error returned when a price is out of range.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price must not be negative (got {0})")]
    Negative(Decimal),
    /// The amount has fractions of a cent.
    #[error("price must have at most 2 decimal places (got {0})")]
    TooPrecise(Decimal),
    /// The amount does not fit the stored column.
    #[error("price must not exceed 9999999999.99 (got {0})")]
    TooLarge(Decimal),
}

/// Decimal places kept for a price.
const MAX_SCALE: u32 = 2;

/// A price that is guaranteed to be zero or greater, in whole cents, and small
/// enough for `NUMERIC(12, 2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type), sqlx(transparent))]
pub struct Price(Decimal);

impl Price {
    /// Create a price.
    ///
    /// Trailing zeros do not count as decimal places, so `19.990` is accepted.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero,
    /// [`PriceError::TooPrecise`] if it has more than two decimal places and
    /// [`PriceError::TooLarge`] if it exceeds [`Price::max_amount`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        if amount.normalize().scale() > MAX_SCALE {
            return Err(PriceError::TooPrecise(amount));
        }
        if amount > Self::max_amount() {
            return Err(PriceError::TooLarge(amount));
        }
        Ok(Self(amount))
    }

    /// Largest accepted amount, `9999999999.99`.
    #[must_use]
    pub fn max_amount() -> Decimal {
        Decimal::new(999_999_999_999, MAX_SCALE)
    }

    /// Get the decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = rust_decimal::serde::float::deserialize(deserializer)?;
        Self::new(amount).map_err(de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_allowed() {
        assert!(Price::new(Decimal::ZERO).is_ok());
        assert!(Price::new(Decimal::new(-0, 2)).is_ok());
    }

    #[test]
    fn test_negative_is_rejected() {
        let err = Price::new(Decimal::new(-1, 2)).unwrap_err();
        assert_eq!(err, PriceError::Negative(Decimal::new(-1, 2)));
    }

    #[test]
    fn test_fractions_of_a_cent_are_rejected() {
        let amount = Decimal::new(19_999, 3);
        assert_eq!(Price::new(amount), Err(PriceError::TooPrecise(amount)));
        assert!(Price::new(Decimal::new(19_990, 3)).is_ok());
        assert!(serde_json::from_str::<Price>("19.999").is_err());
    }

    #[test]
    fn test_upper_bound() {
        assert!(Price::new(Price::max_amount()).is_ok());

        let amount = Decimal::new(12_345_678_901, 0);
        assert_eq!(Price::new(amount), Err(PriceError::TooLarge(amount)));
    }

    #[test]
    fn test_json_number_round_trip() {
        let price: Price = serde_json::from_str("19.99").unwrap();
        assert_eq!(price.amount(), Decimal::new(1999, 2));
        assert_eq!(serde_json::to_string(&price).unwrap(), "19.99");
    }

    #[test]
    fn test_json_negative_fails_to_deserialize() {
        assert!(serde_json::from_str::<Price>("-5").is_err());
    }

    #[test]
    fn test_display_has_two_decimals() {
        let price = Price::new(Decimal::new(5, 0)).unwrap();
        assert_eq!(price.to_string(), "5.00");
    }
}
