use anyhow::{Context, Result};
use clap::Parser;
use tokio::runtime::Runtime;

use swing_sniper::{BinanceProvider, Cli, JsonFileProvider, Scanner, SeriesProvider, run};

fn main() -> Result<()> {
    // A. Init Logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    // B. Parse Args
    let args = Cli::parse();
    #[cfg(debug_assertions)]
    log::info!("Parsed arguments: {:?}", args);

    // C. Scan (one request in flight at a time)
    let rt = Runtime::new().context("Failed to create Tokio runtime")?;
    match &args.data_dir {
        Some(dir) => {
            let scanner = Scanner::new(JsonFileProvider::new(dir));
            log::info!("Using {} provider at {:?}", scanner.provider().signature(), dir);
            rt.block_on(run(&scanner, &args.command));
        }
        None => {
            let scanner = Scanner::new(BinanceProvider::new()?);
            log::info!("Using {} provider", scanner.provider().signature());
            rt.block_on(run(&scanner, &args.command));
        }
    }
    Ok(())
}
