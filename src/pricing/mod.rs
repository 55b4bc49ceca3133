use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::model::Dozens;
use crate::store::ValidationError;

/// Unit prices for the current session.
///
/// Whole dozens are charged at `per_dozen`. Anything below a dozen is charged
/// in quarter steps derived from `per_half_dozen`: a quarter costs half of it,
/// three quarters cost one and a half of it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Prices {
    per_dozen: Decimal,
    per_half_dozen: Decimal,
}

impl Default for Prices {
    fn default() -> Self {
        Self {
            per_dozen: dec!(6000),
            per_half_dozen: dec!(3500),
        }
    }
}

impl Prices {
    /// Highest unit price accepted.
    pub const MAX: Decimal = dec!(1000000000000);

    /// Upper bound of any order total: both lines at `Dozens::MAX` and `MAX` prices.
    pub const MAX_ORDER_TOTAL: Decimal = dec!(10000000000000000000);

    pub fn new(per_dozen: Decimal, per_half_dozen: Decimal) -> Result<Self, ValidationError> {
        for price in [per_dozen, per_half_dozen] {
            if price.is_sign_negative() && !price.is_zero() {
                return Err(ValidationError::NegativePrice(price));
            }
            if price > Self::MAX {
                return Err(ValidationError::PriceTooLarge(price));
            }
        }

        Ok(Self {
            per_dozen,
            per_half_dozen,
        })
    }

    pub fn per_dozen(&self) -> Decimal {
        self.per_dozen
    }

    pub fn per_half_dozen(&self) -> Decimal {
        self.per_half_dozen
    }

    /// Price of a single product line.
    pub fn line_total(&self, quantity: Dozens) -> Decimal {
        let half = self.per_half_dozen;
        let quarter = half / dec!(2);

        let remainder = quantity.remainder();
        let partial = if remainder == dec!(0.25) {
            quarter
        } else if remainder == dec!(0.5) {
            half
        } else if remainder == dec!(0.75) {
            half + quarter
        } else {
            Decimal::ZERO
        };

        // below one dozen only the partial rule applies
        let whole = if quantity.value() >= Decimal::ONE {
            quantity.whole() * self.per_dozen
        } else {
            Decimal::ZERO
        };

        (whole + partial).normalize()
    }

    /// Total of an order holding both products.
    pub fn order_total(&self, quantity_a: Dozens, quantity_b: Dozens) -> Decimal {
        (self.line_total(quantity_a) + self.line_total(quantity_b)).normalize()
    }
}
