//! Exact decimal money amounts.
//!
//! All monetary fields in the system use [`Money`], a thin wrapper over
//! [`rust_decimal::Decimal`]. Floating point is never used for amounts, so
//! sums and averages are reproducible regardless of accumulation order.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Mul};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A monetary amount in the shop's single operating currency.
///
/// Wraps a [`Decimal`] and carries exact-arithmetic addition and a half-up
/// rounding step for figures that are presented to two decimal places.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Number of decimal places money is presented with.
    pub const SCALE: u32 = 2;

    /// Create a new amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Get the underlying decimal value.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Round half-up to two decimal places.
    #[must_use]
    pub fn round_half_up(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(Self::SCALE, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    fn mul(self, quantity: i64) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Self> for Money {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    #[test]
    fn test_round_half_up_at_midpoint() {
        assert_eq!(Money::new(dec!(2.345)).round_half_up(), Money::new(dec!(2.35)));
        assert_eq!(Money::new(dec!(2.344)).round_half_up(), Money::new(dec!(2.34)));
    }

    #[test]
    fn test_sum_is_exact() {
        let amounts = [Money::new(dec!(0.10)), Money::new(dec!(0.20)), Money::new(dec!(0.30))];
        let total: Money = amounts.iter().sum();
        assert_eq!(total, Money::new(dec!(0.60)));
    }

    #[test]
    fn test_line_total() {
        assert_eq!(Money::new(dec!(19.99)) * 3, Money::new(dec!(59.97)));
    }

    #[test]
    fn test_display_two_places() {
        assert_eq!(Money::new(dec!(5)).to_string(), "5.00");
        assert_eq!(Money::new(dec!(12.5)).to_string(), "12.50");
    }
}
