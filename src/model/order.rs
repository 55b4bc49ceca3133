use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::ops::Deref;

use crate::pricing::Prices;
use crate::store::ValidationError;

use super::Dozens;

/// The customer an order belongs to. Doubles as the key of the order table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CustomerName(String);

impl CustomerName {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyCustomerName);
        }

        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CustomerName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CustomerName> for String {
    fn from(name: CustomerName) -> Self {
        name.0
    }
}

impl Deref for CustomerName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for CustomerName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub customer_name: CustomerName,
    pub quantity_a: Dozens,
    pub quantity_b: Dozens,
    pub total: Decimal,
}

impl OrderRecord {
    /// Prices a new order at the current unit prices.
    pub fn priced(
        customer_name: CustomerName,
        quantity_a: Dozens,
        quantity_b: Dozens,
        prices: &Prices,
    ) -> Self {
        let total = prices.order_total(quantity_a, quantity_b);
        Self {
            customer_name,
            quantity_a,
            quantity_b,
            total,
        }
    }

    /// Replaces both quantities and recomputes the total. Other records keep
    /// whatever total they were priced at.
    pub fn reprice(&mut self, quantity_a: Dozens, quantity_b: Dozens, prices: &Prices) {
        self.quantity_a = quantity_a;
        self.quantity_b = quantity_b;
        self.total = prices.order_total(quantity_a, quantity_b);
    }

    pub fn belongs_to(&self, key: &str) -> bool {
        self.customer_name.as_str() == key.trim()
    }
}
