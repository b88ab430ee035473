use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::Timeframe;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
pub enum ZoneKind {
    /// Members span at most half the merge threshold
    Exact,
    Wide,
}

/// A confluence level: two or more extrema whose prices merged under the threshold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Level {
    /// Mean of member prices
    pub price: f64,
    pub touches: usize,
    pub timeframes: BTreeSet<Timeframe>,
    /// (max - min) / min of member prices, in percent
    pub width_pct: f64,
    pub zone_kind: ZoneKind,
}

/// Where the merge threshold came from.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ThresholdSource {
    /// Daily ATR as a fraction of the last close
    DailyAtr { atr_pct: f64 },
    Fallback,
}

/// Levels either side of the current price, nearest first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelReport {
    pub current_price: f64,
    pub threshold: f64,
    pub threshold_source: ThresholdSource,
    pub resistances: Vec<Level>,
    pub supports: Vec<Level>,
}
