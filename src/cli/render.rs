use std::io::{self, Write};

use crate::model::{OrderRecord, Totals};
use crate::store::HEADER;

const NUMBER_WIDTH: usize = 12;

/// Writes the order table followed by the running totals.
pub fn table<W: Write>(out: &mut W, records: &[OrderRecord], totals: &Totals) -> io::Result<()> {
    let width = records
        .iter()
        .map(|record| record.customer_name.chars().count())
        .chain([HEADER[0].len(), totals_label(totals).len()])
        .max()
        .unwrap_or_default();

    writeln!(
        out,
        "{:<width$}  {:>nw$}  {:>nw$}  {:>nw$}",
        HEADER[0],
        HEADER[1],
        HEADER[2],
        HEADER[3],
        width = width,
        nw = NUMBER_WIDTH
    )?;
    for record in records {
        writeln!(
            out,
            "{:<width$}  {:>nw$}  {:>nw$}  {:>nw$}",
            record.customer_name.as_str(),
            record.quantity_a.to_string(),
            record.quantity_b.to_string(),
            record.total.to_string(),
            width = width,
            nw = NUMBER_WIDTH
        )?;
    }
    writeln!(out, "{}", "-".repeat(width + 3 * (NUMBER_WIDTH + 2)))?;
    writeln!(
        out,
        "{:<width$}  {:>nw$}  {:>nw$}  {:>nw$}",
        totals_label(totals),
        totals.quantity_a.to_string(),
        totals.quantity_b.to_string(),
        totals.total.to_string(),
        width = width,
        nw = NUMBER_WIDTH
    )
}

pub fn summary<W: Write>(out: &mut W, totals: &Totals) -> io::Result<()> {
    writeln!(out, "Orders:               {}", totals.orders)?;
    writeln!(out, "Dozens of product A:  {}", totals.quantity_a)?;
    writeln!(out, "Dozens of product B:  {}", totals.quantity_b)?;
    writeln!(out, "Total collected:      {}", totals.total)
}

pub fn record<W: Write>(out: &mut W, record: &OrderRecord) -> io::Result<()> {
    writeln!(
        out,
        "{}: {} dozen A, {} dozen B, total {}",
        record.customer_name, record.quantity_a, record.quantity_b, record.total
    )
}

fn totals_label(totals: &Totals) -> String {
    format!("Totals ({} orders)", totals.orders)
}
