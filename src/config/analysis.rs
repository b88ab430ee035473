//! Analysis and computation configuration

use crate::domain::Timeframe;

/// Settings for the RSI divergence scan
pub struct DivergenceSettings {
    // How many candles to request per timeframe
    pub candle_limit: usize,
    // Max index distance between the current swing and a reference swing
    pub lookback_window: usize,
    // A swing this many bars beyond `order` from the last candle still counts as live
    pub active_slack: usize,
    // Extrema order for 15m/1h (noisier, so smaller window)
    pub fast_order: usize,
    pub default_order: usize,
}

impl DivergenceSettings {
    pub fn order_for(&self, timeframe: Timeframe) -> usize {
        if timeframe.is_intraday_fast() {
            self.fast_order
        } else {
            self.default_order
        }
    }
}

/// Settings for multi-timeframe support/resistance confluence
pub struct ConfluenceSettings {
    pub candle_limit: usize,
    pub atr_period: usize,
    // Daily candles fetched to estimate volatility
    pub daily_candle_limit: usize,
    // Merge threshold = daily ATR% * this
    pub atr_threshold_multiplier: f64,
    // Used when ATR can't be computed (0.008 == 0.8%)
    pub fallback_threshold_pct: f64,
    // Levels reported per side (supports / resistances)
    pub max_results: usize,
    // Extrema order per timeframe; coarser bars need a smaller window
    pub m15_h1_order: usize,
    pub h4_order: usize,
    pub d1_order: usize,
    pub w1_order: usize,
    pub default_order: usize,
}

impl ConfluenceSettings {
    pub fn order_for(&self, timeframe: Timeframe) -> usize {
        match timeframe {
            Timeframe::M15 | Timeframe::H1 => self.m15_h1_order,
            Timeframe::H4 => self.h4_order,
            Timeframe::D1 => self.d1_order,
            Timeframe::W1 => self.w1_order,
            _ => self.default_order,
        }
    }
}

/// Settings for the daily market snapshot
pub struct SnapshotSettings {
    pub daily_candle_limit: usize,
    pub sma_period: usize,
}

/// The Master Analysis Configuration
pub struct AnalysisConfig {
    pub rsi_period: usize,

    // Sub-groups
    pub divergence: DivergenceSettings,
    pub confluence: ConfluenceSettings,
    pub snapshot: SnapshotSettings,
}

pub const ANALYSIS: AnalysisConfig = AnalysisConfig {
    rsi_period: 14,

    divergence: DivergenceSettings {
        candle_limit: 300,
        lookback_window: 60,
        active_slack: 2,
        fast_order: 3,
        default_order: 5,
    },

    confluence: ConfluenceSettings {
        candle_limit: 1000,
        atr_period: 14,
        daily_candle_limit: 60,
        atr_threshold_multiplier: 0.25,
        fallback_threshold_pct: 0.008,
        max_results: 5,
        m15_h1_order: 20,
        h4_order: 10,
        d1_order: 5,
        w1_order: 3,
        default_order: 5,
    },

    snapshot: SnapshotSettings {
        daily_candle_limit: 60,
        sma_period: 20,
    },
};

/// Default timeframes for each scan, finest first
pub const DIVERGENCE_TIMEFRAMES: &[Timeframe] =
    &[Timeframe::M15, Timeframe::H1, Timeframe::H4, Timeframe::D1];
pub const CONFLUENCE_TIMEFRAMES: &[Timeframe] = &[
    Timeframe::M15,
    Timeframe::H1,
    Timeframe::H4,
    Timeframe::D1,
    Timeframe::W1,
];
