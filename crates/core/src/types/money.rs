//! Minor-currency-unit price representation.
//!
//! The backend prices everything in the smallest currency unit (cents for
//! USD). Arithmetic stays in integers; conversion to major units for display
//! goes through [`rust_decimal::Decimal`] so totals never pick up float
//! drift.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An amount in minor currency units (e.g. cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinorUnits(i64);

impl MinorUnits {
    /// Zero amount.
    pub const ZERO: Self = Self(0);

    /// Create an amount from minor units.
    #[must_use]
    pub const fn new(amount: i64) -> Self {
        Self(amount)
    }

    /// The raw minor-unit value.
    #[must_use]
    pub const fn amount(self) -> i64 {
        self.0
    }

    /// The amount in major units (minor / 100), exact.
    #[must_use]
    pub fn major(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Multiply by a line quantity.
    #[must_use]
    pub const fn times(self, quantity: u32) -> Self {
        Self(self.0 * quantity as i64)
    }
}

impl std::ops::Add for MinorUnits {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::iter::Sum for MinorUnits {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, std::ops::Add::add)
    }
}

impl std::fmt::Display for MinorUnits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${:.2}", self.major())
    }
}
