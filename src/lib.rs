#![allow(clippy::collapsible_if)]

// Core modules
pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod models;
pub mod report;
pub mod utils;

// Re-export commonly used types
pub use data::{BinanceProvider, JsonFileProvider, SeriesProvider};
pub use domain::{Candle, PairInterval, Timeframe};
pub use engine::{DivergenceRequest, LevelsRequest, Scanner, UnitResult};
pub use error::{ScanError, ScanResult};
pub use models::{DivergenceEvent, LevelReport, MarketSnapshot, OhlcvTimeSeries};

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

// CLI argument parsing
use clap::{Parser, Subcommand};

use crate::config::ANALYSIS;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Read candles from <DIR>/<SYMBOL>_<tf>.json instead of the Binance API
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// RSI divergences on swing highs and lows
    Divergence {
        #[arg(long, num_args = 1.., required = true)]
        symbols: Vec<String>,
        /// Defaults to 15m 1h 4h 1d
        #[arg(long, num_args = 1..)]
        tfs: Vec<Timeframe>,
        /// Also report swings that are no longer near the last candle
        #[arg(long, default_value_t = false)]
        historical: bool,
        #[arg(long, default_value_t = ANALYSIS.divergence.lookback_window)]
        lookback: usize,
        #[arg(long, default_value_t = ANALYSIS.divergence.candle_limit)]
        limit: usize,
        /// Extrema order per timeframe, e.g. --order 1h=4
        #[arg(long = "order", value_parser = parse_order_override)]
        orders: Vec<(Timeframe, usize)>,
    },
    /// Multi-timeframe support/resistance confluence
    Levels {
        #[arg(long, num_args = 1.., required = true)]
        symbols: Vec<String>,
        /// Defaults to 15m 1h 4h 1d 1w
        #[arg(long, num_args = 1..)]
        tfs: Vec<Timeframe>,
        #[arg(long, default_value_t = ANALYSIS.confluence.candle_limit)]
        limit: usize,
        /// Levels shown per side
        #[arg(long, default_value_t = ANALYSIS.confluence.max_results)]
        max: usize,
        #[arg(long = "order", value_parser = parse_order_override)]
        orders: Vec<(Timeframe, usize)>,
    },
    /// Daily close, RSI and SMA summary
    Snapshot {
        #[arg(long, num_args = 1.., required = true)]
        symbols: Vec<String>,
    },
}

/// Parses `TF=N`, e.g. `4h=8`.
pub fn parse_order_override(text: &str) -> Result<(Timeframe, usize), String> {
    let (tf, order) = text
        .split_once('=')
        .ok_or_else(|| format!("expected TF=N, got {:?}", text))?;
    let timeframe = Timeframe::from_str(tf.trim())
        .map_err(|_| format!("unknown timeframe {:?}", tf))?;
    let order: usize = order
        .trim()
        .parse()
        .map_err(|_| format!("order must be a positive integer, got {:?}", order))?;
    if order == 0 {
        return Err("order must be > 0".to_string());
    }
    Ok((timeframe, order))
}

fn overrides(orders: &[(Timeframe, usize)]) -> BTreeMap<Timeframe, usize> {
    orders.iter().copied().collect()
}

/// Runs one CLI command against `scanner` and prints the report.
pub async fn run<P: SeriesProvider>(scanner: &Scanner<P>, command: &Command) {
    match command {
        Command::Divergence {
            symbols,
            tfs,
            historical,
            lookback,
            limit,
            orders,
        } => {
            let mut request = DivergenceRequest {
                historical: *historical,
                lookback_window: *lookback,
                candle_limit: *limit,
                order_overrides: overrides(orders),
                ..DivergenceRequest::default()
            };
            if !tfs.is_empty() {
                request.timeframes = tfs.clone();
            }
            let results = scanner.scan_divergences(symbols, &request).await;
            println!("{}", report::render_divergences(&results));
        }
        Command::Levels {
            symbols,
            tfs,
            limit,
            max,
            orders,
        } => {
            let mut request = LevelsRequest {
                candle_limit: *limit,
                max_results: *max,
                order_overrides: overrides(orders),
                ..LevelsRequest::default()
            };
            if !tfs.is_empty() {
                request.timeframes = tfs.clone();
            }
            for symbol in symbols {
                let scan = scanner.scan_levels(symbol, &request).await;
                println!("{}\n", report::render_level_scan(&scan));
            }
        }
        Command::Snapshot { symbols } => {
            for symbol in symbols {
                let unit = scanner.snapshot(symbol).await;
                println!("{}", report::render_snapshot(&unit));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_order_override() {
        assert_eq!(parse_order_override("4h=8"), Ok((Timeframe::H4, 8)));
        assert_eq!(parse_order_override(" 1d = 3 "), Ok((Timeframe::D1, 3)));
        assert!(parse_order_override("4h").is_err());
        assert!(parse_order_override("2w=3").is_err());
        assert!(parse_order_override("1h=0").is_err());
    }

    #[test]
    fn test_cli_parses_divergence_command() {
        let cli = Cli::try_parse_from([
            "swing-sniper",
            "--data-dir",
            "candles",
            "divergence",
            "--symbols",
            "BTC/USDT",
            "ETHUSDT",
            "--tfs",
            "1h",
            "4h",
            "--historical",
            "--order",
            "1h=4",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("candles")));
        match cli.command {
            Command::Divergence {
                symbols,
                tfs,
                historical,
                lookback,
                orders,
                ..
            } => {
                assert_eq!(symbols, vec!["BTC/USDT", "ETHUSDT"]);
                assert_eq!(tfs, vec![Timeframe::H1, Timeframe::H4]);
                assert!(historical);
                assert_eq!(lookback, 60);
                assert_eq!(orders, vec![(Timeframe::H1, 4)]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_rejects_bad_timeframe() {
        assert!(Cli::try_parse_from(["swing-sniper", "levels", "--symbols", "BTCUSDT", "--tfs", "7h"]).is_err());
    }
}
