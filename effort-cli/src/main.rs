//! effort-cli: interactive aggregation of per-employee effort hours
//!
//! Employee workbooks (`<EmployeeId>.xlsx`) in the data directory are parsed
//! into study/hours rows, summarised into Excel reports with a flat CSV
//! companion, and charted as SVG.

mod charts;
mod cli;
mod config;
mod effort;
mod report;
#[cfg(test)]
mod test_support;

use colored::*;

use crate::cli::Shell;
use crate::config::Config;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {:#}", "Configuration error:".red().bold(), e);
            std::process::exit(1);
        }
    };
    log::debug!("Using data directory {}", config.data_dir.display());

    println!("{}\n", "Starting effort hours analysis...".bright_cyan());

    if let Err(e) = Shell::new(&config).run() {
        log::error!("Shell stopped: {:#}", e);
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
