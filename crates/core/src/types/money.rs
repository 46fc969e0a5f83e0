//! Non-negative monetary amounts using decimal arithmetic.
//!
//! The storefront works in a single currency, so `Money` is just a checked
//! wrapper over [`Decimal`]. Amounts are in the currency's standard unit,
//! with at most two decimal places and no more than [`Money::MAX`], which is
//! what the order tables' `NUMERIC(12, 2)` columns hold. Arithmetic is
//! checked against the same bound.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing [`Money`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The amount is below zero.
    #[error("amount cannot be negative (got {0})")]
    Negative(Decimal),

    /// The amount has more than two decimal places.
    #[error("amount has more than 2 decimal places (got {0})")]
    TooPrecise(Decimal),

    /// The amount, or the result of arithmetic on amounts, exceeds [`Money::MAX`].
    #[error("amount exceeds {max}", max = Money::MAX)]
    TooLarge,
}

/// A non-negative amount of money.
///
/// Deserialization goes through [`Money::new`], so a negative, over-precise
/// or oversized price in a cached cart or a request body is rejected rather
/// than silently accepted.
///
/// ```
/// use quickcart_core::Money;
/// use rust_decimal::Decimal;
///
/// let price = Money::from_units(500);
/// assert_eq!(price.amount(), Decimal::from(500));
/// assert!(Money::new(Decimal::from(-1)).is_err());
/// assert!(Money::new(Decimal::new(19_999, 3)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest representable amount, `9999999999.99`.
    pub const MAX: Self = Self(Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2));

    /// Decimal places an amount may carry.
    pub const SCALE: u32 = 2;

    /// Create an amount.
    ///
    /// # Errors
    ///
    /// - `MoneyError::Negative` if `amount` is below zero
    /// - `MoneyError::TooPrecise` if `amount` has more than two decimal places
    /// - `MoneyError::TooLarge` if `amount` exceeds [`Money::MAX`]
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative(amount));
        }
        if amount.normalize().scale() > Self::SCALE {
            return Err(MoneyError::TooPrecise(amount));
        }
        if amount > Self::MAX.0 {
            return Err(MoneyError::TooLarge);
        }
        Ok(Self(amount))
    }

    /// Create an amount from a whole number of currency units.
    #[must_use]
    pub fn from_units(units: u32) -> Self {
        Self(Decimal::from(units))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Add two amounts.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::TooLarge` if the sum exceeds [`Money::MAX`].
    pub fn checked_add(self, rhs: Self) -> Result<Self, MoneyError> {
        self.0
            .checked_add(rhs.0)
            .ok_or(MoneyError::TooLarge)
            .and_then(Self::new)
    }

    /// Multiply by a line quantity.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::TooLarge` if the product exceeds [`Money::MAX`].
    pub fn checked_times(self, quantity: u8) -> Result<Self, MoneyError> {
        self.0
            .checked_mul(Decimal::from(quantity))
            .ok_or(MoneyError::TooLarge)
            .and_then(Self::new)
    }

    /// Sum amounts, failing on the first partial sum above [`Money::MAX`].
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::TooLarge` if the total exceeds [`Money::MAX`].
    pub fn checked_sum(amounts: impl IntoIterator<Item = Self>) -> Result<Self, MoneyError> {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, Self::checked_add)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_money_rejects_negative() {
        let err = Money::new(Decimal::from(-5)).unwrap_err();
        assert_eq!(err, MoneyError::Negative(Decimal::from(-5)));
    }

    #[test]
    fn test_money_accepts_zero() {
        assert!(Money::new(Decimal::ZERO).unwrap().is_zero());
    }

    #[test]
    fn test_money_sum_and_times() {
        let total = Money::checked_sum([
            Money::from_units(500),
            Money::from_units(300).checked_times(3).unwrap(),
        ])
        .unwrap();
        assert_eq!(total, Money::from_units(1400));
    }

    #[test]
    fn test_money_max_matches_column_range() {
        assert_eq!(Money::MAX.to_string(), "9999999999.99");
        assert!(Money::new(Money::MAX.amount()).is_ok());

        let over = Money::MAX.amount() + Decimal::new(1, 2);
        assert_eq!(Money::new(over).unwrap_err(), MoneyError::TooLarge);
    }

    #[test]
    fn test_money_rejects_more_than_two_decimals() {
        let err = Money::new(Decimal::new(19_999, 3)).unwrap_err();
        assert_eq!(err, MoneyError::TooPrecise(Decimal::new(19_999, 3)));

        // Trailing zeros don't count
        assert!(Money::new(Decimal::new(19_990, 3)).is_ok());
    }

    #[test]
    fn test_money_arithmetic_is_bounded() {
        assert_eq!(
            Money::MAX.checked_times(2).unwrap_err(),
            MoneyError::TooLarge
        );
        assert_eq!(
            Money::MAX.checked_add(Money::from_units(1)).unwrap_err(),
            MoneyError::TooLarge
        );
        assert_eq!(
            Money::checked_sum([Money::MAX, Money::ZERO]).unwrap(),
            Money::MAX
        );
    }

    #[test]
    fn test_money_deserialize_rejects_negative() {
        let result: Result<Money, _> = serde_json::from_str("-10");
        assert!(result.is_err());

        let huge: Result<Money, _> = serde_json::from_str("\"79228162514264337593543950335\"");
        assert!(huge.is_err());

        let ok: Money = serde_json::from_str("\"19.99\"").unwrap();
        assert_eq!(ok.to_string(), "19.99");
    }
}
