pub use order::{CustomerName, OrderRecord};
pub use quantity::Dozens;
pub use summary::Totals;

mod order;
mod quantity;
mod summary;
