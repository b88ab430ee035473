//! Indicator library: SMA, RSI and ATR-percent over plain price columns.
//!
//! Warm-up bars are `None`, never zero, so callers can drop them before
//! looking for swing points.

use crate::error::{ScanError, ScanResult};
use crate::models::OhlcvTimeSeries;

/// Simple moving average. The first `period - 1` entries are `None`.
pub fn sma(values: &[f64], period: usize) -> ScanResult<Vec<Option<f64>>> {
    if period == 0 {
        return Err(ScanError::InvalidParameter("SMA period must be > 0".to_string()));
    }

    let mut result = vec![None; values.len()];
    for (end, window) in values.windows(period).enumerate() {
        let avg = window.iter().sum::<f64>() / period as f64;
        result[end + period - 1] = avg.is_finite().then_some(avg);
    }
    Ok(result)
}

/// RSI with simple-average smoothing of gains and losses.
///
/// rs = avg_gain / avg_loss, rsi = 100 - 100 / (1 + rs)
///
/// Bar `i` needs the `period` price changes ending at `i`, so the first
/// `period` bars are `None`. A window with no losing bar saturates to 100.
pub fn rsi(closes: &[f64], period: usize) -> ScanResult<Vec<Option<f64>>> {
    if period == 0 {
        return Err(ScanError::InvalidParameter("RSI period must be > 0".to_string()));
    }
    if closes.len() <= period {
        return Ok(vec![None; closes.len()]);
    }

    let changes: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let gains: Vec<f64> = changes.iter().map(|&d| if d > 0.0 { d } else { 0.0 }).collect();
    let losses: Vec<f64> = changes.iter().map(|&d| if d < 0.0 { -d } else { 0.0 }).collect();

    let avg_gains = sma(&gains, period)?;
    let avg_losses = sma(&losses, period)?;

    // changes[k] belongs to bar k + 1, so bar 0 never has a value
    let mut result = Vec::with_capacity(closes.len());
    result.push(None);
    for (avg_gain, avg_loss) in avg_gains.into_iter().zip(avg_losses) {
        let value = match (avg_gain, avg_loss) {
            (Some(_), Some(loss)) if loss == 0.0 => Some(100.0),
            (Some(gain), Some(loss)) => {
                let rs = gain / loss;
                Some(100.0 - 100.0 / (1.0 + rs))
            }
            _ => None,
        };
        result.push(value);
    }

    Ok(result)
}

/// Average true range over the last `period` bars, as a fraction of the last close.
pub fn atr_pct(series: &OhlcvTimeSeries, period: usize) -> ScanResult<f64> {
    if period == 0 {
        return Err(ScanError::InvalidParameter("ATR period must be > 0".to_string()));
    }
    let n = series.klines();
    // Every averaged bar needs a previous close
    if n < period + 1 {
        return Err(ScanError::IndicatorUndefined {
            indicator: "ATR",
            required: period + 1,
            provided: n,
        });
    }

    let true_ranges: Vec<f64> = (n - period..n)
        .map(|idx| {
            let prev_close = series.close_prices[idx - 1];
            series.get_candle(idx).true_range(Some(prev_close))
        })
        .collect();
    let atr = true_ranges.iter().sum::<f64>() / period as f64;

    let last_close = series.close_prices[n - 1];
    if !(last_close.is_finite() && last_close > 0.0) || !atr.is_finite() {
        return Err(ScanError::DegenerateInput(format!(
            "{}: cannot normalise ATR {} by last close {}",
            series.pair_interval, atr, last_close
        )));
    }
    Ok(atr / last_close)
}
