//! Daily momentum summary: last close against RSI and SMA.

use crate::analysis::indicators::{rsi, sma};
use crate::error::{ScanError, ScanResult};
use crate::models::{MarketSnapshot, OhlcvTimeSeries, TrendBias};

pub fn market_snapshot(
    daily: &OhlcvTimeSeries,
    rsi_period: usize,
    sma_period: usize,
) -> ScanResult<MarketSnapshot> {
    let closes = &daily.close_prices;
    let (Some(last_close), Some(timestamp_ms)) =
        (daily.last_close(), daily.last_kline_timestamp_ms())
    else {
        return Err(ScanError::IndicatorUndefined {
            indicator: "snapshot",
            required: 1,
            provided: 0,
        });
    };

    let last_rsi = rsi(closes, rsi_period)?
        .last()
        .copied()
        .flatten()
        .ok_or(ScanError::IndicatorUndefined {
            indicator: "RSI",
            required: rsi_period + 1,
            provided: closes.len(),
        })?;
    let last_sma = sma(closes, sma_period)?
        .last()
        .copied()
        .flatten()
        .ok_or(ScanError::IndicatorUndefined {
            indicator: "SMA",
            required: sma_period,
            provided: closes.len(),
        })?;

    let bias = if last_close > last_sma {
        TrendBias::AboveSma
    } else {
        TrendBias::BelowSma
    };

    Ok(MarketSnapshot {
        last_close,
        rsi: last_rsi,
        sma: last_sma,
        bias,
        timestamp_ms,
    })
}
