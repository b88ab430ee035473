//! Plain-text rendering of scan results for the terminal.

use itertools::Itertools;

use crate::domain::Timeframe;
use crate::engine::{LevelScan, UnitResult};
use crate::error::ScanError;
use crate::models::{DivergenceEvent, Level, LevelReport, MarketSnapshot, ThresholdSource};
use crate::utils::maths_utils::pct_change;
use crate::utils::time_utils::epoch_ms_to_utc;

fn unit_label(symbol: &str, timeframe: Option<Timeframe>) -> String {
    match timeframe {
        Some(tf) => format!("{} [{}]", symbol, tf),
        None => symbol.to_string(),
    }
}

pub fn render_skip(symbol: &str, timeframe: Option<Timeframe>, error: &ScanError) -> String {
    format!("  skipped {}: {}", unit_label(symbol, timeframe), error)
}

pub fn render_divergence_event(event: &DivergenceEvent) -> String {
    format!(
        "  {} {} @ {}: price {:.4} vs {:.4} ({}), RSI {:.1} vs {:.1}",
        event.status,
        event.kind,
        epoch_ms_to_utc(event.timestamp_ms),
        event.anchor_price,
        event.reference_price,
        epoch_ms_to_utc(event.reference_timestamp_ms),
        event.anchor_rsi,
        event.reference_rsi,
    )
}

/// One block per unit; units with no events say so rather than vanish.
pub fn render_divergences(results: &[UnitResult<Vec<DivergenceEvent>>]) -> String {
    let mut lines = Vec::new();
    for unit in results {
        match &unit.outcome {
            Ok(events) if events.is_empty() => {
                lines.push(format!(
                    "{}: no divergences",
                    unit_label(&unit.symbol, unit.timeframe)
                ));
            }
            Ok(events) => {
                lines.push(format!("{}:", unit_label(&unit.symbol, unit.timeframe)));
                lines.extend(events.iter().map(render_divergence_event));
            }
            Err(e) => lines.push(render_skip(&unit.symbol, unit.timeframe, e)),
        }
    }
    lines.join("\n")
}

fn render_level(tag: &str, rank: usize, level: &Level, current_price: f64) -> String {
    format!(
        "  {}{} {:.4} ({:+.2}%) x{} [{}] {} width {:.2}%",
        tag,
        rank + 1,
        level.price,
        pct_change(current_price, level.price),
        level.touches,
        level.timeframes.iter().join(", "),
        level.zone_kind,
        level.width_pct,
    )
}

pub fn render_level_report(symbol: &str, report: &LevelReport) -> String {
    let source = match report.threshold_source {
        ThresholdSource::DailyAtr { atr_pct } => format!("daily ATR {:.2}%", atr_pct * 100.0),
        ThresholdSource::Fallback => "fallback".to_string(),
    };
    let mut lines = vec![format!(
        "{} @ {:.4} (merge threshold {:.3}%, {})",
        symbol,
        report.current_price,
        report.threshold * 100.0,
        source
    )];

    if report.resistances.is_empty() {
        lines.push("  no resistance levels".to_string());
    }
    // Furthest first so the output reads top-down like a price ladder
    for (rank, level) in report.resistances.iter().enumerate().rev() {
        lines.push(render_level("R", rank, level, report.current_price));
    }
    if report.supports.is_empty() {
        lines.push("  no support levels".to_string());
    }
    for (rank, level) in report.supports.iter().enumerate() {
        lines.push(render_level("S", rank, level, report.current_price));
    }
    lines.join("\n")
}

pub fn render_level_scan(scan: &LevelScan) -> String {
    let mut lines = Vec::new();
    match &scan.report.outcome {
        Ok(report) => lines.push(render_level_report(&scan.report.symbol, report)),
        Err(e) => lines.push(render_skip(&scan.report.symbol, None, e)),
    }
    lines.extend(
        scan.timeframes
            .iter()
            .filter_map(|unit| unit.skip_reason().map(|e| render_skip(&unit.symbol, unit.timeframe, e))),
    );
    lines.join("\n")
}

pub fn render_snapshot(unit: &UnitResult<MarketSnapshot>) -> String {
    match &unit.outcome {
        Ok(snap) => format!(
            "{}: close {:.4} RSI {:.1} SMA {:.4} ({}, {:+.2}%) as of {}",
            unit_label(&unit.symbol, unit.timeframe),
            snap.last_close,
            snap.rsi,
            snap.sma,
            snap.bias,
            pct_change(snap.sma, snap.last_close),
            epoch_ms_to_utc(snap.timestamp_ms),
        ),
        Err(e) => render_skip(&unit.symbol, unit.timeframe, e),
    }
}
