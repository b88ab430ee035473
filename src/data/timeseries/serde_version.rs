use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[cfg(debug_assertions)]
use crate::config::debug::PRINT_PROVIDER_CALLS;
use crate::data::timeseries::SeriesProvider;
use crate::domain::{Candle, PairInterval, Timeframe};
use crate::models::OhlcvTimeSeries;

/// Offline candles from `<dir>/<SYMBOL>_<tf>.json`, e.g. `data/BTCUSDT_4h.json`.
///
/// Each file is a JSON array of `{timestamp, open, high, low, close, volume}`
/// objects, oldest first.
pub struct JsonFileProvider {
    pub data_dir: PathBuf,
}

impl JsonFileProvider {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn path_for(&self, pair_interval: &PairInterval) -> PathBuf {
        self.data_dir
            .join(format!("{}.json", pair_interval.file_stem()))
    }
}

pub fn parse_candles(content: &str, source: &Path) -> Result<Vec<Candle>> {
    serde_json::from_str(content)
        .with_context(|| format!("Failed to parse candles from {:?}", source))
}

#[async_trait]
impl SeriesProvider for JsonFileProvider {
    fn signature(&self) -> &'static str {
        "Local JSON"
    }

    async fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<OhlcvTimeSeries> {
        let pair_interval = PairInterval::new(symbol, timeframe);
        let full_path = self.path_for(&pair_interval);

        #[cfg(debug_assertions)]
        if PRINT_PROVIDER_CALLS {
            log::debug!("Reading candles from: {:?}...", full_path);
        }

        let content = tokio::fs::read_to_string(&full_path)
            .await
            .with_context(|| format!("Failed to read {:?}", full_path))?;
        let candles = parse_candles(&content, &full_path)?;

        let series = OhlcvTimeSeries::from_candles(pair_interval, &candles);
        series.validate()?;
        Ok(series.most_recent(limit))
    }
}
