use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum TrendBias {
    AboveSma,
    BelowSma,
}

/// Last-close momentum summary for one symbol on the daily timeframe.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub last_close: f64,
    pub rsi: f64,
    pub sma: f64,
    pub bias: TrendBias,
    pub timestamp_ms: i64,
}
