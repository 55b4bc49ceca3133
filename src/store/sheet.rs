use std::fs;
use std::io::{Cursor, ErrorKind};
use std::path::PathBuf;

use calamine::{Data, Reader, Xlsx};
use log::debug;
use rust_decimal::Decimal;
use rust_xlsxwriter::Workbook;

use crate::model::{CustomerName, Dozens, OrderRecord};
use crate::pricing::Prices;

use super::error::{Result, StoreError};
use super::Persistence;

pub const SHEET_NAME: &str = "Orders";
pub const HEADER: [&str; 4] = ["customer_name", "quantity_a", "quantity_b", "total"];

/// Renders the table as an xlsx workbook with a single sheet.
pub fn encode(records: &[OrderRecord]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, title) in HEADER.iter().enumerate() {
        worksheet.write_string(0, col as u16, *title)?;
    }

    for (index, record) in records.iter().enumerate() {
        let row = index as u32 + 1;
        worksheet.write_string(row, 0, record.customer_name.as_str())?;
        worksheet.write_number(row, 1, f64::try_from(record.quantity_a.value())?)?;
        worksheet.write_number(row, 2, f64::try_from(record.quantity_b.value())?)?;
        worksheet.write_number(row, 3, f64::try_from(record.total)?)?;
    }

    Ok(workbook.save_to_buffer()?)
}

/// Parses a workbook produced by [`encode`], or any workbook whose first sheet
/// has the same header row.
pub fn decode(bytes: Vec<u8>) -> Result<Vec<OrderRecord>> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Err(malformed(0, "workbook has no sheets")),
    };

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        // a sheet without even a header is an empty table
        return Ok(Vec::new());
    };
    check_header(header)?;

    rows.enumerate()
        .filter(|(_, cells)| !cells.iter().all(|cell| *cell == Data::Empty))
        .map(|(index, cells)| parse_row(index + 2, cells))
        .collect()
}

fn check_header(cells: &[Data]) -> Result<()> {
    let found: Vec<String> = cells
        .iter()
        .map(|cell| match cell {
            Data::String(s) => s.trim().to_string(),
            Data::Empty => String::new(),
            other => format!("{:?}", other),
        })
        .collect();

    // columns are matched by position, anything after them must be blank
    let names_match = found.len() >= HEADER.len() && found.iter().zip(HEADER).all(|(a, b)| a == b);
    let trailing_blank = found.iter().skip(HEADER.len()).all(|cell| cell.is_empty());
    if !names_match || !trailing_blank {
        return Err(malformed(
            1,
            &format!("expected header {:?}, found {:?}", HEADER, found),
        ));
    }

    Ok(())
}

fn parse_row(row: usize, cells: &[Data]) -> Result<OrderRecord> {
    let empty = Data::Empty;
    let cell = |col: usize| cells.get(col).unwrap_or(&empty);

    let name = match cell(0) {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        other => return Err(malformed(row, &format!("customer_name is {:?}", other))),
    };
    let customer_name =
        CustomerName::new(&name).map_err(|err| malformed(row, &err.to_string()))?;

    let quantity_a = parse_number(row, HEADER[1], cell(1))?;
    let quantity_a = Dozens::new(quantity_a).map_err(|err| malformed(row, &err.to_string()))?;
    let quantity_b = parse_number(row, HEADER[2], cell(2))?;
    let quantity_b = Dozens::new(quantity_b).map_err(|err| malformed(row, &err.to_string()))?;
    let total = parse_number(row, HEADER[3], cell(3))?;
    if (total.is_sign_negative() && !total.is_zero()) || total > Prices::MAX_ORDER_TOTAL {
        return Err(malformed(row, &format!("total out of range: {}", total)));
    }

    Ok(OrderRecord {
        customer_name,
        quantity_a,
        quantity_b,
        total,
    })
}

fn parse_number(row: usize, column: &str, cell: &Data) -> Result<Decimal> {
    let value = match cell {
        Data::Float(f) => Decimal::try_from(*f)?,
        Data::Int(i) => Decimal::from(*i),
        Data::String(s) => s
            .trim()
            .parse()
            .map_err(|_| malformed(row, &format!("{} is not a number: {:?}", column, s)))?,
        other => {
            return Err(malformed(
                row,
                &format!("{} is not a number: {:?}", column, other),
            ))
        }
    };

    Ok(value.normalize())
}

fn malformed(row: usize, reason: &str) -> StoreError {
    StoreError::MalformedSheet {
        row,
        reason: reason.to_string(),
    }
}

/// The order table kept in a single xlsx file on disk.
#[derive(Debug, Clone)]
pub struct XlsxFile {
    path: PathBuf,
}

impl XlsxFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[cfg(test)]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Sibling file the workbook is written to before it replaces the real one.
    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Persistence for XlsxFile {
    fn read(&self) -> Result<Option<Vec<OrderRecord>>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("No order file at {}", self.path.display());
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        debug!("Read {} bytes from {}", bytes.len(), self.path.display());
        decode(bytes).map(Some)
    }

    fn write(&mut self, records: &[OrderRecord]) -> Result<()> {
        let bytes = encode(records)?;
        let staging = self.staging_path();

        let written = fs::write(&staging, &bytes).and_then(|_| fs::rename(&staging, &self.path));
        if let Err(err) = written {
            let _ = fs::remove_file(&staging);
            return Err(err.into());
        }

        debug!(
            "Wrote {} orders ({} bytes) to {}",
            records.len(),
            bytes.len(),
            self.path.display()
        );
        Ok(())
    }

    fn remove(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Removed {}", self.path.display());
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
