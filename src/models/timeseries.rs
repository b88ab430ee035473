use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::domain::candle::Candle;
use crate::domain::pair_interval::PairInterval;

// ============================================================================
// OhlcvTimeSeries: Raw time series data for one symbol/timeframe
// ============================================================================

/// Column-wise candle series, ascending by open time.
/// Engines only ever borrow it; indicators return new vectors.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OhlcvTimeSeries {
    pub pair_interval: PairInterval,

    pub timestamps_ms: Vec<i64>,

    // Prices
    pub open_prices: Vec<f64>,
    pub high_prices: Vec<f64>,
    pub low_prices: Vec<f64>,
    pub close_prices: Vec<f64>,

    pub volumes: Vec<f64>,
}

impl OhlcvTimeSeries {
    pub fn from_candles(pair_interval: PairInterval, candles: &[Candle]) -> Self {
        OhlcvTimeSeries {
            pair_interval,
            timestamps_ms: candles.iter().map(|c| c.timestamp_ms).collect(),
            open_prices: candles.iter().map(|c| c.open_price).collect(),
            high_prices: candles.iter().map(|c| c.high_price).collect(),
            low_prices: candles.iter().map(|c| c.low_price).collect(),
            close_prices: candles.iter().map(|c| c.close_price).collect(),
            volumes: candles.iter().map(|c| c.volume).collect(),
        }
    }

    pub fn get_candle(&self, idx: usize) -> Candle {
        Candle::new(
            self.timestamps_ms[idx],
            self.open_prices[idx],
            self.high_prices[idx],
            self.low_prices[idx],
            self.close_prices[idx],
            self.volumes[idx],
        )
    }

    pub fn klines(&self) -> usize {
        self.timestamps_ms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps_ms.is_empty()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.close_prices.last().copied()
    }

    pub fn first_kline_timestamp_ms(&self) -> Option<i64> {
        self.timestamps_ms.first().copied()
    }

    pub fn last_kline_timestamp_ms(&self) -> Option<i64> {
        self.timestamps_ms.last().copied()
    }

    /// Keeps only the most recent `count` candles.
    pub fn most_recent(mut self, count: usize) -> Self {
        let start = self.klines().saturating_sub(count);
        if start > 0 {
            self.timestamps_ms.drain(..start);
            self.open_prices.drain(..start);
            self.high_prices.drain(..start);
            self.low_prices.drain(..start);
            self.close_prices.drain(..start);
            self.volumes.drain(..start);
        }
        self
    }

    /// Checks the column lengths agree and open times strictly increase.
    pub fn validate(&self) -> Result<()> {
        let n = self.klines();
        let columns = [
            self.open_prices.len(),
            self.high_prices.len(),
            self.low_prices.len(),
            self.close_prices.len(),
            self.volumes.len(),
        ];
        if columns.iter().any(|&len| len != n) {
            bail!("{}: column lengths differ {:?} vs {} timestamps", self.pair_interval, columns, n);
        }
        if let Some(pos) = self.timestamps_ms.windows(2).position(|w| w[1] <= w[0]) {
            bail!(
                "{}: candles not strictly ascending at index {} ({} then {})",
                self.pair_interval,
                pos + 1,
                self.timestamps_ms[pos],
                self.timestamps_ms[pos + 1]
            );
        }
        Ok(())
    }
}
