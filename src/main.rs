mod config;
mod db;
mod error;
mod ledger;
mod models;
mod payment;
mod report;
mod run;
mod util;

#[cfg(test)]
mod util_tests;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        run::print_usage();
        return Ok(());
    }

    let settings = config::Settings::load()?;
    let db = db::Database::open(&settings.db_path)
        .with_context(|| format!("Failed to open ledger at {}", settings.db_path.display()))?;
    run::as_cli(&args, &db, &settings)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("daycare_ledger=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
