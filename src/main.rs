use clap::Parser;
use log::error;
use std::process::ExitCode;

use crate::cli::Cli;
use crate::config::Config;

mod cli;
mod config;
mod model;
mod pricing;
mod store;
mod utils;

fn main() -> ExitCode {
    // Read environment variables from .env
    dotenv::dotenv().ok();

    // Initialize logger from environment
    env_logger::init();

    let cli = Cli::parse();

    // Parse config from environment
    let config = match envy::prefixed("APP_").from_env::<Config>() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to parse config: {}", e);
            eprintln!("error: invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = cli::run(cli, config) {
        error!("{:#}", e);
        eprintln!("error: {:#}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
