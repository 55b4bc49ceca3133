use std::fmt::{Display, Formatter};
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::store::ValidationError;

/// A quantity of pastries counted in dozens, restricted to quarter-dozen steps.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Dozens(Decimal);

impl Dozens {
    pub const ZERO: Dozens = Dozens(Decimal::ZERO);

    /// Largest order line accepted. Keeps every total well inside `Decimal` range.
    pub const MAX: Dozens = Dozens(dec!(1000000));

    const STEPS_PER_DOZEN: Decimal = dec!(4);

    pub fn new(value: Decimal) -> Result<Self, ValidationError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(ValidationError::NegativeQuantity(value));
        }
        if value > Self::MAX.0 {
            return Err(ValidationError::QuantityTooLarge(value));
        }
        if !(value * Self::STEPS_PER_DOZEN).fract().is_zero() {
            return Err(ValidationError::OffGridQuantity(value));
        }

        Ok(Self(value.normalize()))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Whole dozens.
    pub fn whole(&self) -> Decimal {
        self.0.trunc()
    }

    /// Remainder below one dozen: one of 0, 0.25, 0.5 or 0.75.
    pub fn remainder(&self) -> Decimal {
        self.0.fract()
    }
}

impl TryFrom<Decimal> for Dozens {
    type Error = ValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Dozens> for Decimal {
    fn from(dozens: Dozens) -> Self {
        dozens.0
    }
}

impl FromStr for Dozens {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim())
            .map_err(|_| ValidationError::UnparsableQuantity(s.to_string()))?;
        Self::new(value)
    }
}

impl Display for Dozens {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl Add for Dozens {
    type Output = Dozens;

    fn add(self, rhs: Self) -> Self::Output {
        // the grid is closed under addition
        Self(self.0 + rhs.0)
    }
}

impl Sum for Dozens {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Dozens::ZERO, Add::add)
    }
}
