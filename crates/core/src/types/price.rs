//! Rupee prices using decimal arithmetic.
//!
//! The storefront sells in a single currency, so a [`Price`] is just a
//! non-float amount of rupees with a fixed display glyph.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Currency glyph prefixed to every rendered price.
pub const CURRENCY_GLYPH: &str = "₹";

/// An amount of rupees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero rupees.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of rupees.
    #[must_use]
    pub fn from_rupees(rupees: i64) -> Self {
        Self(Decimal::from(rupees))
    }

    /// The underlying amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether this price is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Subtract, clamping at zero.
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        if other.0 >= self.0 {
            Self::ZERO
        } else {
            Self(self.0 - other.0)
        }
    }

    /// Percentage saved when `self` is sold at `sale`, rounded half away
    /// from zero.
    ///
    /// Returns `None` when `self` is not a positive amount or the sale price
    /// is not actually lower.
    #[must_use]
    pub fn discount_percent_to(self, sale: Self) -> Option<u32> {
        if self.0 <= Decimal::ZERO || sale.0 >= self.0 {
            return None;
        }
        let pct = ((self.0 - sale.0) / self.0 * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        pct.to_u32().filter(|pct| *pct > 0)
    }
}

impl fmt::Display for Price {
    /// Whole amounts render without decimals (`₹45`), fractional amounts with
    /// two (`₹49.50`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let amount = self.0.round_dp(2);
        if amount.fract().is_zero() {
            write!(f, "{CURRENCY_GLYPH}{}", amount.trunc().normalize())
        } else {
            write!(f, "{CURRENCY_GLYPH}{amount:.2}")
        }
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self::Output {
        Self(self.0 * Decimal::from(quantity))
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
