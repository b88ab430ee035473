pub mod bnapi_version;
pub mod serde_version;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::Timeframe;
use crate::models::OhlcvTimeSeries;

/// Anything that can hand back recent candles for one (symbol, timeframe).
///
/// Implementations return candles ascending by open time. Returning fewer
/// than `limit` candles is fine; returning an empty series is left to the
/// caller to treat as missing data.
#[async_trait]
pub trait SeriesProvider: Send + Sync {
    async fn fetch(&self, symbol: &str, timeframe: Timeframe, limit: usize)
    -> Result<OhlcvTimeSeries>;

    /// A unique identifier for this implementation (so that afterwards we know which one we used).
    fn signature(&self) -> &'static str;
}
