//! RSI divergence matching.
//!
//! Each swing high (low) is compared against the *dominant* earlier swing high
//! (low) inside the lookback window, not just the previous one, so small
//! intermediate swings don't produce signals on their own.

use std::collections::BTreeMap;

use crate::analysis::extrema::{find_peaks, find_valleys};
use crate::analysis::indicators::rsi;
use crate::config::ANALYSIS;
#[cfg(debug_assertions)]
use crate::config::debug::PRINT_DIVERGENCE_CANDIDATES;
use crate::domain::Timeframe;
use crate::error::{ScanError, ScanResult};
use crate::models::{DivergenceEvent, DivergenceKind, DivergenceStatus, OhlcvTimeSeries};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DivergenceParams {
    /// Extrema window half-width
    pub order: usize,
    /// Max bars between the current swing and a reference swing
    pub lookback_window: usize,
    /// Report swings older than the live window too
    pub historical: bool,
    pub rsi_period: usize,
    pub active_slack: usize,
}

impl Default for DivergenceParams {
    fn default() -> Self {
        Self {
            order: ANALYSIS.divergence.default_order,
            lookback_window: ANALYSIS.divergence.lookback_window,
            historical: false,
            rsi_period: ANALYSIS.rsi_period,
            active_slack: ANALYSIS.divergence.active_slack,
        }
    }
}

impl DivergenceParams {
    pub fn for_timeframe(timeframe: Timeframe, historical: bool) -> Self {
        Self {
            order: ANALYSIS.divergence.order_for(timeframe),
            historical,
            ..Self::default()
        }
    }
}

/// A confirmed swing pair, as positions in the RSI-defined view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SwingMatch {
    anchor: usize,
    reference: usize,
    is_active: bool,
}

impl DivergenceKind {
    /// Is `price` a more extreme swing than `other` for this side?
    fn more_extreme(&self, price: f64, other: f64) -> bool {
        match self {
            DivergenceKind::Bearish => price > other,
            DivergenceKind::Bullish => price < other,
        }
    }

    /// Momentum failed to follow price to the new extreme.
    fn momentum_diverges(&self, rsi_anchor: f64, rsi_reference: f64) -> bool {
        match self {
            DivergenceKind::Bearish => rsi_anchor < rsi_reference,
            DivergenceKind::Bullish => rsi_anchor > rsi_reference,
        }
    }
}

/// Scans one series for bearish (swing highs) and bullish (swing lows) divergences.
///
/// Bars whose RSI is still warming up are dropped before swing detection, so
/// a series too short for RSI plus one full extrema window gives no events.
/// Events are unique per bar and sorted most recent first.
pub fn detect_divergences(
    series: &OhlcvTimeSeries,
    params: &DivergenceParams,
) -> ScanResult<Vec<DivergenceEvent>> {
    if params.order == 0 {
        return Err(ScanError::InvalidParameter(
            "divergence order must be > 0".to_string(),
        ));
    }

    let rsi_values = rsi(&series.close_prices, params.rsi_period)?;

    // Positions in the original series for every bar with a defined RSI
    let bars: Vec<usize> = rsi_values
        .iter()
        .enumerate()
        .filter_map(|(idx, value)| value.map(|_| idx))
        .collect();
    if bars.is_empty() {
        return Ok(Vec::new());
    }
    let highs: Vec<f64> = bars.iter().map(|&i| series.high_prices[i]).collect();
    let lows: Vec<f64> = bars.iter().map(|&i| series.low_prices[i]).collect();
    let rsi_view: Vec<f64> = bars.iter().filter_map(|&i| rsi_values[i]).collect();

    // Keyed by bar timestamp: one event per bar, later inserts win
    let mut by_bar: BTreeMap<i64, DivergenceEvent> = BTreeMap::new();

    for (kind, prices) in [
        (DivergenceKind::Bearish, &highs),
        (DivergenceKind::Bullish, &lows),
    ] {
        for found in scan_side(kind, prices, &rsi_view, params) {
            let anchor_bar = bars[found.anchor];
            let reference_bar = bars[found.reference];
            let event = DivergenceEvent {
                kind,
                status: if found.is_active {
                    DivergenceStatus::Active
                } else {
                    DivergenceStatus::Historical
                },
                anchor_index: anchor_bar,
                anchor_price: prices[found.anchor],
                anchor_rsi: rsi_view[found.anchor],
                reference_index: reference_bar,
                reference_price: prices[found.reference],
                reference_rsi: rsi_view[found.reference],
                timestamp_ms: series.timestamps_ms[anchor_bar],
                reference_timestamp_ms: series.timestamps_ms[reference_bar],
            };
            by_bar.insert(event.timestamp_ms, event);
        }
    }

    Ok(by_bar.into_values().rev().collect())
}

/// Runs the swing comparison for one side. `prices` are highs for bearish,
/// lows for bullish; `rsi_values` is aligned with `prices`.
fn scan_side(
    kind: DivergenceKind,
    prices: &[f64],
    rsi_values: &[f64],
    params: &DivergenceParams,
) -> Vec<SwingMatch> {
    let swings = match kind {
        DivergenceKind::Bearish => find_peaks(prices, params.order),
        DivergenceKind::Bullish => find_valleys(prices, params.order),
    };
    let Some(last) = prices.len().checked_sub(1) else {
        return Vec::new();
    };

    let mut matches = Vec::new();
    for (pos, &current) in swings.iter().enumerate().skip(1) {
        let is_active = last - current <= params.order + params.active_slack;
        if !params.historical && !is_active {
            continue;
        }

        // Dominant earlier swing in the window; strict comparison keeps the earliest on ties
        let major = swings[..pos]
            .iter()
            .copied()
            .filter(|&prior| current - prior <= params.lookback_window)
            .fold(None, |best: Option<usize>, prior| match best {
                Some(b) if !kind.more_extreme(prices[prior], prices[b]) => Some(b),
                _ => Some(prior),
            });
        let Some(reference) = major else {
            continue;
        };

        let confirmed = kind.more_extreme(prices[current], prices[reference])
            && kind.momentum_diverges(rsi_values[current], rsi_values[reference]);

        #[cfg(debug_assertions)]
        if PRINT_DIVERGENCE_CANDIDATES {
            log::debug!(
                "{} swing at {} ({:.4}, rsi {:.1}) vs major {} ({:.4}, rsi {:.1}) -> {}",
                kind,
                current,
                prices[current],
                rsi_values[current],
                reference,
                prices[reference],
                rsi_values[reference],
                confirmed
            );
        }

        if confirmed {
            matches.push(SwingMatch {
                anchor: current,
                reference,
                is_active,
            });
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Candle, PairInterval};

    fn series_from_closes(closes: &[f64]) -> OhlcvTimeSeries {
        let candles: Vec<Candle> = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle::new(i as i64 * 3_600_000, c, c + 0.5, c - 0.5, c, 1.0))
            .collect();
        OhlcvTimeSeries::from_candles(PairInterval::new("BTC/USDT", Timeframe::H1), &candles)
    }

    /// Steep rally to a first peak (index 30), pullback, then a choppy grind
    /// to a second peak (index 57 when `pairs == 9`), then `tail` falling bars.
    fn two_peak_closes(pairs: usize, last_up: f64, tail: usize) -> Vec<f64> {
        let mut c = Vec::new();
        let mut x = 110.0;
        for _ in 0..20 {
            c.push(x);
            x -= 0.5;
        }
        for _ in 0..10 {
            c.push(x);
            x += 2.0;
        }
        c.push(x);
        for _ in 0..8 {
            x -= 1.5;
            c.push(x);
        }
        for _ in 0..pairs {
            x += 3.0;
            c.push(x);
            x -= 1.5;
            c.push(x);
        }
        x += last_up;
        c.push(x);
        for _ in 0..tail {
            x -= 2.0;
            c.push(x);
        }
        c
    }

    fn params(order: usize, historical: bool) -> DivergenceParams {
        DivergenceParams {
            order,
            historical,
            ..DivergenceParams::default()
        }
    }

    #[test]
    fn test_bearish_divergence_against_major_peak() {
        let series = series_from_closes(&two_peak_closes(9, 3.0, 4));
        let events = detect_divergences(&series, &params(3, false)).unwrap();

        assert_eq!(events.len(), 1, "events: {:?}", events);
        let e = &events[0];
        assert_eq!(e.kind, DivergenceKind::Bearish);
        assert_eq!(e.status, DivergenceStatus::Active);
        assert_eq!((e.anchor_index, e.reference_index), (57, 30));
        assert_eq!((e.anchor_price, e.reference_price), (125.0, 120.5));
        assert!(e.anchor_rsi < e.reference_rsi);
        assert_eq!(e.timestamp_ms, 57 * 3_600_000);
    }

    #[test]
    fn test_old_swing_only_reported_in_historical_mode() {
        let series = series_from_closes(&two_peak_closes(9, 3.0, 10));
        assert!(detect_divergences(&series, &params(3, false)).unwrap().is_empty());

        let events = detect_divergences(&series, &params(3, true)).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].status, DivergenceStatus::Historical);
        assert_eq!(events[0].anchor_index, 57);
    }

    #[test]
    fn test_lower_high_with_weaker_rsi_is_not_divergence() {
        let series = series_from_closes(&two_peak_closes(7, 1.0, 4));
        assert!(detect_divergences(&series, &params(3, true)).unwrap().is_empty());
    }

    #[test]
    fn test_bullish_divergence_mirrors_bearish() {
        let mirrored: Vec<f64> = two_peak_closes(9, 3.0, 4)
            .into_iter()
            .map(|c| 220.0 - c)
            .collect();
        let events = detect_divergences(&series_from_closes(&mirrored), &params(3, false)).unwrap();
        assert_eq!(events.len(), 1);
        let e = &events[0];
        assert_eq!(e.kind, DivergenceKind::Bullish);
        assert_eq!((e.anchor_index, e.reference_index), (57, 30));
        assert_eq!((e.anchor_price, e.reference_price), (95.0, 99.5));
        assert!(e.anchor_rsi > e.reference_rsi);
    }

    #[test]
    fn test_short_series_gives_no_events() {
        // Fewer than 2 * order + period bars
        let closes: Vec<f64> = (0..18).map(|i| 100.0 + (i % 4) as f64).collect();
        let events = detect_divergences(&series_from_closes(&closes), &params(3, true)).unwrap();
        assert!(events.is_empty());
        assert!(detect_divergences(&series_from_closes(&[]), &params(3, true)).unwrap().is_empty());
    }

    #[test]
    fn test_zero_order_rejected() {
        let series = series_from_closes(&two_peak_closes(9, 3.0, 4));
        assert!(matches!(
            detect_divergences(&series, &params(0, true)),
            Err(ScanError::InvalidParameter(_))
        ));
    }

    // Peaks (order 1) at 1 (50.0), 5 (20.0) and 7 (60.0)
    const PEAK_PRICES: [f64; 9] = [1.0, 50.0, 1.0, 0.5, 1.0, 20.0, 1.0, 60.0, 1.0];
    const PEAK_RSI: [f64; 9] = [50.0, 80.0, 50.0, 50.0, 50.0, 30.0, 50.0, 50.0, 50.0];

    fn window_params(lookback_window: usize) -> DivergenceParams {
        DivergenceParams {
            order: 1,
            lookback_window,
            historical: true,
            ..DivergenceParams::default()
        }
    }

    #[test]
    fn test_reference_at_exact_lookback_is_included() {
        // Peak 1 is exactly 6 bars before peak 7
        let found = scan_side(DivergenceKind::Bearish, &PEAK_PRICES, &PEAK_RSI, &window_params(6));
        assert_eq!(
            found,
            vec![SwingMatch {
                anchor: 7,
                reference: 1,
                is_active: true
            }]
        );
    }

    #[test]
    fn test_reference_beyond_lookback_is_excluded() {
        // With the global max out of reach, peak 5 is the reference and RSI 50 > 30
        let found = scan_side(DivergenceKind::Bearish, &PEAK_PRICES, &PEAK_RSI, &window_params(5));
        assert!(found.is_empty(), "got {:?}", found);
    }

    #[test]
    fn test_reference_tie_resolves_to_earliest() {
        let prices = [1.0, 50.0, 1.0, 0.5, 1.0, 50.0, 1.0, 60.0, 1.0];
        let rsi_values = [50.0, 70.0, 50.0, 50.0, 50.0, 90.0, 50.0, 60.0, 50.0];
        let found = scan_side(DivergenceKind::Bearish, &prices, &rsi_values, &window_params(60));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].reference, 1);
    }

    #[test]
    fn test_bullish_side_uses_lowest_valley() {
        let prices: Vec<f64> = PEAK_PRICES.iter().map(|p| 100.0 - p).collect();
        let rsi_values: Vec<f64> = PEAK_RSI.iter().map(|r| 100.0 - r).collect();
        let found = scan_side(DivergenceKind::Bullish, &prices, &rsi_values, &window_params(6));
        assert_eq!(found.len(), 1);
        assert_eq!((found[0].anchor, found[0].reference), (7, 1));
    }

    #[test]
    fn test_live_mode_skips_inactive_swings() {
        // Same peaks, but the series runs on long after the last one
        let mut prices = PEAK_PRICES.to_vec();
        let mut rsi_values = PEAK_RSI.to_vec();
        prices.extend([0.9, 0.8, 0.7, 0.6, 0.5]);
        rsi_values.extend([50.0; 5]);
        let live = DivergenceParams {
            historical: false,
            ..window_params(6)
        };
        assert!(scan_side(DivergenceKind::Bearish, &prices, &rsi_values, &live).is_empty());

        let found = scan_side(DivergenceKind::Bearish, &prices, &rsi_values, &window_params(6));
        assert_eq!(found.len(), 1);
        assert!(!found[0].is_active);
    }

    #[test]
    fn test_active_boundary_is_order_plus_slack() {
        // Order 1, slack 2: the swing at 7 stays live until 3 bars past it
        let mut prices = PEAK_PRICES.to_vec();
        let mut rsi_values = PEAK_RSI.to_vec();
        prices.extend([0.9, 0.8]);
        rsi_values.extend([50.0; 2]);
        let found = scan_side(DivergenceKind::Bearish, &prices, &rsi_values, &window_params(6));
        assert_eq!(found.len(), 1);
        assert!(found[0].is_active, "last - anchor == 3 must be active");

        prices.push(0.7);
        rsi_values.push(50.0);
        let found = scan_side(DivergenceKind::Bearish, &prices, &rsi_values, &window_params(6));
        assert_eq!(found.len(), 1);
        assert!(!found[0].is_active, "last - anchor == 4 must be historical");

        let live = DivergenceParams {
            historical: false,
            ..window_params(6)
        };
        assert!(scan_side(DivergenceKind::Bearish, &prices, &rsi_values, &live).is_empty());
    }

    /// Chop, a rally topping at 25, a slide bottoming at 45, then flat chop to 69.
    /// `high_spike` / `low_spike` push one bar's high or low far outside the range.
    fn spiked_series(high_spike: Option<usize>, low_spike: Option<usize>) -> OhlcvTimeSeries {
        let mut closes = Vec::new();
        let mut x = 100.0;
        for i in 0..16 {
            closes.push(x);
            x += if i % 2 == 0 { 1.0 } else { -1.0 };
        }
        for _ in 0..10 {
            x += 2.0;
            closes.push(x);
        }
        for _ in 0..20 {
            x -= 2.0;
            closes.push(x);
        }
        for i in 0..24 {
            x += if i % 2 == 0 { 1.0 } else { -1.0 };
            closes.push(x);
        }

        let candles: Vec<Candle> = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let high = if high_spike == Some(i) { 200.0 } else { c + 0.5 };
                let low = if low_spike == Some(i) { 50.0 } else { c - 0.5 };
                Candle::new(i as i64 * 3_600_000, c, high, low, c, 1.0)
            })
            .collect();
        OhlcvTimeSeries::from_candles(PairInterval::new("BTC/USDT", Timeframe::H1), &candles)
    }

    #[test]
    fn test_events_sorted_newest_first() {
        let events = detect_divergences(&spiked_series(Some(55), Some(62)), &params(3, true)).unwrap();
        assert_eq!(events.len(), 2, "events: {:?}", events);
        assert_eq!((events[0].kind, events[0].anchor_index), (DivergenceKind::Bullish, 62));
        assert_eq!(events[0].reference_index, 45);
        assert_eq!((events[1].kind, events[1].anchor_index), (DivergenceKind::Bearish, 55));
        assert_eq!(events[1].reference_index, 25);
        assert!(events[0].timestamp_ms > events[1].timestamp_ms);

        let swapped = detect_divergences(&spiked_series(Some(62), Some(55)), &params(3, true)).unwrap();
        assert_eq!(swapped.len(), 2);
        assert_eq!((swapped[0].kind, swapped[0].anchor_index), (DivergenceKind::Bearish, 62));
        assert_eq!((swapped[1].kind, swapped[1].anchor_index), (DivergenceKind::Bullish, 55));
    }

    #[test]
    fn test_outside_bar_keeps_bullish_event() {
        // Each spike alone yields a divergence at bar 60
        let bearish = detect_divergences(&spiked_series(Some(60), None), &params(3, true)).unwrap();
        assert_eq!(bearish.len(), 1);
        assert_eq!(bearish[0].kind, DivergenceKind::Bearish);
        let bullish = detect_divergences(&spiked_series(None, Some(60)), &params(3, true)).unwrap();
        assert_eq!(bullish.len(), 1);
        assert_eq!(bullish[0].kind, DivergenceKind::Bullish);

        let events = detect_divergences(&spiked_series(Some(60), Some(60)), &params(3, true)).unwrap();
        assert_eq!(events.len(), 1, "events: {:?}", events);
        assert_eq!(events[0].kind, DivergenceKind::Bullish);
        assert_eq!((events[0].anchor_index, events[0].reference_index), (60, 45));
        assert_eq!(events[0].anchor_price, 50.0);
    }
}
