use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
pub enum DivergenceKind {
    /// Lower low in price, higher low in RSI
    Bullish,
    /// Higher high in price, lower high in RSI
    Bearish,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
pub enum DivergenceStatus {
    /// The anchor swing is among the last `order + slack` bars of the series
    Active,
    Historical,
}

/// One divergence between a recent swing (the anchor) and the dominant
/// earlier swing inside the lookback window (the reference).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DivergenceEvent {
    pub kind: DivergenceKind,
    pub status: DivergenceStatus,

    pub anchor_index: usize,
    pub anchor_price: f64,
    pub anchor_rsi: f64,

    pub reference_index: usize,
    pub reference_price: f64,
    pub reference_rsi: f64,

    /// Open time of the anchor bar
    pub timestamp_ms: i64,
    pub reference_timestamp_ms: i64,
}
