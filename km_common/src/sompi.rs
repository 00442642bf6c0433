use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const KAS_CURRENCY_CODE: &str = "KAS";
pub const KAS_CURRENCY_CODE_LOWER: &str = "kas";

/// Number of sompi in one KAS. Sompi is the smallest indivisible unit of Kaspa.
pub const SOMPI_PER_KAS: i64 = 100_000_000;

//--------------------------------------       Sompi         ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Sompi(i64);

op!(binary Sompi, Add, add);
op!(binary Sompi, Sub, sub);
op!(inplace Sompi, SubAssign, sub_assign);
op!(unary Sompi, Neg, neg);

impl Mul<i64> for Sompi {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from(self.value() * rhs)
    }
}

impl Sum for Sompi {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in sompi: {0}")]
pub struct SompiConversionError(String);

impl From<i64> for Sompi {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Sompi {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Sompi {}

impl TryFrom<u64> for Sompi {
    type Error = SompiConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(SompiConversionError(format!("Value {} is too large to convert to Sompi", value)))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Sompi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.abs() < 10_000 {
            write!(f, "{} sompi", self.0)
        } else {
            let kas = self.0 as f64 / SOMPI_PER_KAS as f64;
            write!(f, "{kas:0.8} {KAS_CURRENCY_CODE}")
        }
    }
}

impl Sompi {
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Converts a KAS amount to sompi, rounding to the nearest whole sompi.
    pub fn from_kas(kas: f64) -> Self {
        Self((kas * SOMPI_PER_KAS as f64).round() as i64)
    }

    pub fn as_kas(&self) -> f64 {
        self.0 as f64 / SOMPI_PER_KAS as f64
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn kas_conversions() {
        assert_eq!(Sompi::from_kas(1.0).value(), SOMPI_PER_KAS);
        assert_eq!(Sompi::from_kas(0.1).value(), 10_000_000);
        // round-to-nearest on sub-sompi fractions
        assert_eq!(Sompi::from_kas(0.000_000_015).value(), 2);
        assert_eq!(Sompi::from(250_000_000).as_kas(), 2.5);
    }

    #[test]
    fn display_switches_units() {
        assert_eq!(Sompi::from(9_999).to_string(), "9999 sompi");
        assert_eq!(Sompi::from(150_000_000).to_string(), "1.50000000 KAS");
    }

    #[test]
    fn arithmetic() {
        let a = Sompi::from(500);
        let b = Sompi::from(250);
        assert_eq!(a + b, Sompi::from(750));
        assert_eq!(a - b, Sompi::from(250));
        assert_eq!(b * 4, Sompi::from(1000));
        assert_eq!([a, b].into_iter().sum::<Sompi>(), Sompi::from(750));
    }
}
