use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::PathBuf;

use crate::pricing::Prices;
use crate::store::ValidationError;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    #[serde(default = "default_price_per_dozen")]
    pub price_per_dozen: Decimal,
    #[serde(default = "default_price_per_half_dozen")]
    pub price_per_half_dozen: Decimal,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            price_per_dozen: default_price_per_dozen(),
            price_per_half_dozen: default_price_per_half_dozen(),
        }
    }
}

impl Config {
    pub fn prices(&self) -> Result<Prices, ValidationError> {
        Prices::new(self.price_per_dozen, self.price_per_half_dozen)
    }
}

fn default_data_file() -> PathBuf {
    "orders.xlsx".into()
}

fn default_price_per_dozen() -> Decimal {
    dec!(6000)
}

fn default_price_per_half_dozen() -> Decimal {
    dec!(3500)
}
