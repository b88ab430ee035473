use std::collections::BTreeMap;

use crate::config::{ANALYSIS, CONFLUENCE_TIMEFRAMES, DIVERGENCE_TIMEFRAMES};
use crate::domain::Timeframe;
use crate::error::{ScanError, ScanResult};
use crate::models::LevelReport;

/// What to scan for divergences, per symbol.
#[derive(Debug, Clone)]
pub struct DivergenceRequest {
    pub timeframes: Vec<Timeframe>,
    pub historical: bool,
    pub lookback_window: usize,
    pub candle_limit: usize,
    /// Replaces the default extrema order for the given timeframes
    pub order_overrides: BTreeMap<Timeframe, usize>,
}

impl Default for DivergenceRequest {
    fn default() -> Self {
        Self {
            timeframes: DIVERGENCE_TIMEFRAMES.to_vec(),
            historical: false,
            lookback_window: ANALYSIS.divergence.lookback_window,
            candle_limit: ANALYSIS.divergence.candle_limit,
            order_overrides: BTreeMap::new(),
        }
    }
}

/// What to pool for confluence levels, per symbol.
/// The first timeframe also supplies the current price.
#[derive(Debug, Clone)]
pub struct LevelsRequest {
    pub timeframes: Vec<Timeframe>,
    pub candle_limit: usize,
    pub max_results: usize,
    pub order_overrides: BTreeMap<Timeframe, usize>,
}

impl Default for LevelsRequest {
    fn default() -> Self {
        Self {
            timeframes: CONFLUENCE_TIMEFRAMES.to_vec(),
            candle_limit: ANALYSIS.confluence.candle_limit,
            max_results: ANALYSIS.confluence.max_results,
            order_overrides: BTreeMap::new(),
        }
    }
}

/// Outcome of one unit of work. `timeframe` is `None` for per-symbol results.
#[derive(Debug)]
pub struct UnitResult<T> {
    pub symbol: String,
    pub timeframe: Option<Timeframe>,
    pub outcome: ScanResult<T>,
}

impl<T> UnitResult<T> {
    pub fn new(symbol: &str, timeframe: Option<Timeframe>, outcome: ScanResult<T>) -> Self {
        Self {
            symbol: symbol.to_string(),
            timeframe,
            outcome,
        }
    }

    pub fn skip_reason(&self) -> Option<&ScanError> {
        self.outcome.as_ref().err()
    }

    pub fn is_skipped(&self) -> bool {
        self.outcome.is_err()
    }
}

/// Levels for one symbol, plus how each pooled timeframe fared.
/// Per-timeframe outcomes carry the number of swing points contributed.
#[derive(Debug)]
pub struct LevelScan {
    pub report: UnitResult<LevelReport>,
    pub timeframes: Vec<UnitResult<usize>>,
}
