//! Error types for the order store

use rust_decimal::Decimal;
use thiserror::Error;

/// Input rejected before any calculation or write happens
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("customer name must not be empty")]
    EmptyCustomerName,

    #[error("quantity must not be negative, got {0}")]
    NegativeQuantity(Decimal),

    #[error("quantity must be a multiple of 0.25 dozen, got {0}")]
    OffGridQuantity(Decimal),

    #[error("quantity must not exceed 1000000 dozens, got {0}")]
    QuantityTooLarge(Decimal),

    #[error("not a quantity: {0:?}")]
    UnparsableQuantity(String),

    #[error("price must not be negative, got {0}")]
    NegativePrice(Decimal),

    #[error("price must not exceed 1000000000000, got {0}")]
    PriceTooLarge(Decimal),

    /// Customer names key the table, so a second order under the same name is refused
    #[error("an order for {0} already exists")]
    DuplicateCustomer(String),
}

/// Main error type for store operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The customer is not (or no longer) in the table
    #[error("no order found for {0}")]
    NotFound(String),

    #[error("could not access the order file: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not write the spreadsheet: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),

    #[error("could not read the spreadsheet: {0}")]
    Read(#[from] calamine::XlsxError),

    #[error("malformed spreadsheet at row {row}: {reason}")]
    MalformedSheet {
        /// 1-based spreadsheet row
        row: usize,
        reason: String,
    },

    #[error("number does not fit a spreadsheet cell: {0}")]
    Number(#[from] rust_decimal::Error),
}

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
