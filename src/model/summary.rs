use rust_decimal::Decimal;
use serde::Serialize;

use super::{Dozens, OrderRecord};

/// Column sums over the order table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub orders: usize,
    pub quantity_a: Dozens,
    pub quantity_b: Dozens,
    pub total: Decimal,
}

impl Totals {
    pub fn of<'a>(records: impl IntoIterator<Item = &'a OrderRecord>) -> Self {
        records.into_iter().fold(Totals::default(), |acc, record| Totals {
            orders: acc.orders + 1,
            quantity_a: acc.quantity_a + record.quantity_a,
            quantity_b: acc.quantity_b + record.quantity_b,
            total: acc.total + record.total,
        })
    }
}
