use chrono::NaiveDate;
use std::path::{Path, PathBuf};

const EXPORT_PREFIX: &str = "orders";

/// Download name of an export taken on `date`, e.g. `orders_2024-05-01.xlsx`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("{}_{}.xlsx", EXPORT_PREFIX, date.format("%Y-%m-%d"))
}

/// Where an export lands. A directory target receives the date-stamped name,
/// anything else is taken as the file to write.
pub fn export_target(output: Option<&Path>, date: NaiveDate) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(export_file_name(date)),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(export_file_name(date)),
    }
}
