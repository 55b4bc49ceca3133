use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use log::{debug, warn};
use rust_decimal::Decimal;

use crate::config::Config;
use crate::model::Dozens;
use crate::store::{OrderStore, Persistence, StoreError, XlsxFile};
use crate::utils::export_target;

mod render;

/// Keep track of pastry orders in a spreadsheet
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Spreadsheet holding the orders [env: APP_DATA_FILE]
    #[arg(long, global = true)]
    pub file: Option<PathBuf>,

    /// Price of one dozen for this session [env: APP_PRICE_PER_DOZEN]
    #[arg(long, global = true)]
    pub price_per_dozen: Option<Decimal>,

    /// Price of half a dozen for this session [env: APP_PRICE_PER_HALF_DOZEN]
    #[arg(long, global = true)]
    pub price_per_half_dozen: Option<Decimal>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record a new order
    Add {
        name: String,
        /// Dozens of product A, in steps of 0.25
        #[arg(short = 'a', long, default_value = "0")]
        quantity_a: Dozens,
        /// Dozens of product B, in steps of 0.25
        #[arg(short = 'b', long, default_value = "0")]
        quantity_b: Dozens,
    },
    /// Show the order of one customer
    Show { name: String },
    /// Change the quantities of an order and reprice it
    Edit {
        name: String,
        /// New dozens of product A, unchanged when omitted
        #[arg(short = 'a', long)]
        quantity_a: Option<Dozens>,
        /// New dozens of product B, unchanged when omitted
        #[arg(short = 'b', long)]
        quantity_b: Option<Dozens>,
    },
    /// Delete the order of one customer
    Delete { name: String },
    /// Delete every order and the spreadsheet itself
    Clear {
        /// Confirm that all orders should go
        #[arg(long)]
        yes: bool,
    },
    /// Write a copy of the table to a date-stamped spreadsheet
    Export {
        /// Target file, or directory to place the date-stamped file in
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List every order with the running totals
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show the running totals
    Summary {
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Lets flags given on the command line win over the environment.
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(file) = &self.file {
            config.data_file = file.clone();
        }
        if let Some(price) = self.price_per_dozen {
            config.price_per_dozen = price;
        }
        if let Some(price) = self.price_per_half_dozen {
            config.price_per_half_dozen = price;
        }
        config
    }
}

pub fn run(cli: Cli, config: Config) -> Result<()> {
    let config = cli.apply(config);
    let file = XlsxFile::new(&config.data_file);
    let mut store = OrderStore::load(file, config.prices()?)
        .with_context(|| format!("could not load orders from {}", config.data_file.display()))?;
    debug!(
        "Using {} with {} per dozen and {} per half dozen",
        config.data_file.display(),
        store.prices().per_dozen(),
        store.prices().per_half_dozen()
    );

    let mut out = io::stdout().lock();
    execute(cli.command, &mut store, &mut out, Local::now().date_naive())
}

/// Runs one user action against the store and reports the outcome on `out`.
pub fn execute<P: Persistence, W: Write>(
    command: Command,
    store: &mut OrderStore<P>,
    out: &mut W,
    today: NaiveDate,
) -> Result<()> {
    match command {
        Command::Add {
            name,
            quantity_a,
            quantity_b,
        } => {
            let record = store.add(&name, quantity_a, quantity_b)?;
            writeln!(
                out,
                "Added order for {} totalling {}",
                record.customer_name, record.total
            )?;
        }

        Command::Show { name } => match store.find(&name) {
            Some(record) => render::record(out, record)?,
            None => not_found(out, &name)?,
        },

        Command::Edit {
            name,
            quantity_a,
            quantity_b,
        } => {
            let Some(current) = store.find(&name) else {
                return not_found(out, &name);
            };
            let quantity_a = quantity_a.unwrap_or(current.quantity_a);
            let quantity_b = quantity_b.unwrap_or(current.quantity_b);

            match store.update(&name, quantity_a, quantity_b) {
                Ok(record) => {
                    writeln!(out, "Updated order:")?;
                    render::record(out, record)?;
                }
                Err(StoreError::NotFound(name)) => not_found(out, &name)?,
                Err(err) => return Err(err.into()),
            }
        }

        Command::Delete { name } => match store.delete(&name) {
            Ok(removed) => writeln!(out, "Deleted {} order(s) for {}", removed, name.trim())?,
            Err(StoreError::NotFound(name)) => not_found(out, &name)?,
            Err(err) => return Err(err.into()),
        },

        Command::Clear { yes } => {
            if !yes {
                writeln!(
                    out,
                    "This deletes all {} orders; run again with --yes to confirm",
                    store.len()
                )?;
                return Ok(());
            }
            store.clear()?;
            writeln!(out, "All orders were deleted")?;
        }

        Command::Export { output } => {
            let target = export_target(output.as_deref(), today);
            let bytes = store.export()?;
            fs::write(&target, bytes)
                .with_context(|| format!("could not write export to {}", target.display()))?;
            writeln!(out, "Exported {} orders to {}", store.len(), target.display())?;
        }

        Command::List { json } => {
            let totals = store.totals();
            if json {
                let body = serde_json::json!({
                    "orders": store.records(),
                    "totals": totals,
                });
                serde_json::to_writer_pretty(&mut *out, &body)?;
                writeln!(out)?;
            } else if store.is_empty() {
                writeln!(out, "No orders yet")?;
            } else {
                render::table(out, store.records(), &totals)?;
            }
        }

        Command::Summary { json } => {
            let totals = store.totals();
            if json {
                serde_json::to_writer_pretty(&mut *out, &totals)?;
                writeln!(out)?;
            } else {
                render::summary(out, &totals)?;
            }
        }
    }

    Ok(())
}

fn not_found<W: Write>(out: &mut W, name: &str) -> Result<()> {
    warn!("No order found for {}", name.trim());
    writeln!(out, "No order found for {}", name.trim())?;
    Ok(())
}
