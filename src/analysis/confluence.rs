//! Multi-timeframe support/resistance confluence.
//!
//! Swing points from every timeframe are pooled, sorted by price and merged
//! greedily: each point joins the open cluster if it lies within `threshold`
//! of the cluster's running mean. The threshold scales with the asset's daily
//! ATR so quiet and volatile assets get comparable zones.

use std::cmp::Ordering;

use crate::analysis::indicators::atr_pct;
use crate::config::ANALYSIS;
#[cfg(debug_assertions)]
use crate::config::debug::PRINT_CLUSTER_WALK;
use crate::error::{ScanError, ScanResult};
use crate::models::{
    ExtremaPoint, Level, LevelReport, OhlcvTimeSeries, ThresholdSource, ZoneKind,
};
use crate::utils::maths_utils::{get_min_max, relative_distance};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfluenceParams {
    pub atr_period: usize,
    pub atr_threshold_multiplier: f64,
    pub fallback_threshold_pct: f64,
    /// Levels kept per side
    pub max_results: usize,
}

impl Default for ConfluenceParams {
    fn default() -> Self {
        Self {
            atr_period: ANALYSIS.confluence.atr_period,
            atr_threshold_multiplier: ANALYSIS.confluence.atr_threshold_multiplier,
            fallback_threshold_pct: ANALYSIS.confluence.fallback_threshold_pct,
            max_results: ANALYSIS.confluence.max_results,
        }
    }
}

/// Merge threshold from daily volatility: ATR% * multiplier.
pub fn adaptive_threshold(daily: &OhlcvTimeSeries, params: &ConfluenceParams) -> ScanResult<f64> {
    let daily_atr_pct = atr_pct(daily, params.atr_period)?;
    Ok(daily_atr_pct * params.atr_threshold_multiplier)
}

/// Same as [`adaptive_threshold`], but never fails: any error (missing daily
/// data included) drops back to the fixed fallback threshold.
pub fn resolve_threshold(
    daily: ScanResult<&OhlcvTimeSeries>,
    params: &ConfluenceParams,
) -> (f64, ThresholdSource) {
    match daily.and_then(|series| atr_pct(series, params.atr_period)) {
        Ok(atr_pct) => (
            atr_pct * params.atr_threshold_multiplier,
            ThresholdSource::DailyAtr { atr_pct },
        ),
        Err(e) => {
            log::warn!(
                "ATR threshold unavailable ({}), using fallback {:.2}%",
                e,
                params.fallback_threshold_pct * 100.0
            );
            (params.fallback_threshold_pct, ThresholdSource::Fallback)
        }
    }
}

/// Greedy single-linkage clustering over price-sorted points.
///
/// Input order doesn't matter. Clusters with a single member are discarded.
pub fn cluster_levels(points: &[ExtremaPoint], threshold: f64) -> ScanResult<Vec<Level>> {
    if !(threshold.is_finite() && threshold >= 0.0) {
        return Err(ScanError::InvalidParameter(format!(
            "merge threshold must be a finite non-negative fraction, got {}",
            threshold
        )));
    }
    if let Some(bad) = points.iter().find(|p| !(p.price.is_finite() && p.price > 0.0)) {
        return Err(ScanError::DegenerateInput(format!(
            "{} {} at index {} has price {}",
            bad.timeframe, bad.kind, bad.index, bad.price
        )));
    }

    let mut sorted: Vec<&ExtremaPoint> = points.iter().collect();
    sorted.sort_by(|a, b| {
        a.price
            .total_cmp(&b.price)
            .then_with(|| a.timeframe.cmp(&b.timeframe))
            .then_with(|| a.index.cmp(&b.index))
    });

    let mut clusters: Vec<Vec<&ExtremaPoint>> = Vec::new();
    let mut current: Vec<&ExtremaPoint> = Vec::new();
    let mut current_sum = 0.0;

    for point in sorted {
        if !current.is_empty() {
            let running_mean = current_sum / current.len() as f64;
            if relative_distance(point.price, running_mean) > threshold {
                #[cfg(debug_assertions)]
                if PRINT_CLUSTER_WALK {
                    log::debug!(
                        "closing cluster of {} around {:.4}; {:.4} is {:.3}% away",
                        current.len(),
                        running_mean,
                        point.price,
                        relative_distance(point.price, running_mean) * 100.0
                    );
                }
                clusters.push(std::mem::take(&mut current));
                current_sum = 0.0;
            }
        }
        current_sum += point.price;
        current.push(point);
    }
    if !current.is_empty() {
        clusters.push(current);
    }

    Ok(clusters
        .into_iter()
        .filter(|members| members.len() >= 2)
        .map(|members| build_level(&members, threshold))
        .collect())
}

fn build_level(members: &[&ExtremaPoint], threshold: f64) -> Level {
    let prices: Vec<f64> = members.iter().map(|p| p.price).collect();
    let (min_price, max_price) = get_min_max(&prices);
    let width_pct = (max_price - min_price) / min_price * 100.0;
    let zone_kind = if width_pct <= threshold * 100.0 / 2.0 {
        ZoneKind::Exact
    } else {
        ZoneKind::Wide
    };

    Level {
        price: prices.iter().sum::<f64>() / prices.len() as f64,
        touches: members.len(),
        timeframes: members.iter().map(|p| p.timeframe).collect(),
        width_pct,
        zone_kind,
    }
}

/// Splits levels around `current_price`, nearest first on each side.
/// Levels sitting exactly on the price are neither support nor resistance.
pub fn rank_levels(
    levels: Vec<Level>,
    current_price: f64,
    max_results: usize,
    threshold: f64,
    threshold_source: ThresholdSource,
) -> LevelReport {
    let (mut resistances, mut supports): (Vec<Level>, Vec<Level>) = levels
        .into_iter()
        .filter(|level| level.price != current_price)
        .partition(|level| level.price > current_price);

    resistances.sort_by(|a, b| a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal));
    supports.sort_by(|a, b| b.price.partial_cmp(&a.price).unwrap_or(Ordering::Equal));
    resistances.truncate(max_results);
    supports.truncate(max_results);

    LevelReport {
        current_price,
        threshold,
        threshold_source,
        resistances,
        supports,
    }
}
