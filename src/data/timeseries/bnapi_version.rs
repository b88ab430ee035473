pub mod bn_kline;

use anyhow::{Context, Result};
use async_trait::async_trait;
use binance_sdk::spot::rest_api::RestApi;
use tokio::time::Instant;

use crate::data::timeseries::SeriesProvider;
use crate::domain::{PairInterval, Timeframe};
use crate::models::OhlcvTimeSeries;
use crate::utils::time_utils::epoch_ms_to_utc;

/// Live candles from the Binance Spot REST API.
pub struct BinanceProvider {
    rest_client: RestApi,
}

impl BinanceProvider {
    pub fn new() -> Result<Self> {
        let rest_client =
            bn_kline::configure_binance_client().context("Failed to configure Binance client")?;
        Ok(Self { rest_client })
    }
}

#[async_trait]
impl SeriesProvider for BinanceProvider {
    fn signature(&self) -> &'static str {
        "Binance API"
    }

    async fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<OhlcvTimeSeries> {
        let pair_interval = PairInterval::new(symbol, timeframe);
        let start_time = Instant::now();

        let candles = bn_kline::load_klines(&self.rest_client, &pair_interval, limit).await?;
        let series = OhlcvTimeSeries::from_candles(pair_interval, &candles);
        series.validate()?;

        if let (Some(first), Some(last)) = (
            series.first_kline_timestamp_ms(),
            series.last_kline_timestamp_ms(),
        ) {
            log::debug!(
                "{} (started on {}, ended on {}) with {} klines in {:?}",
                series.pair_interval,
                epoch_ms_to_utc(first),
                epoch_ms_to_utc(last),
                series.klines(),
                start_time.elapsed()
            );
        }
        Ok(series)
    }
}
