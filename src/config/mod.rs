//! Configuration module for the swing scanner.

pub mod analysis;
pub mod binance;

pub mod debug;

// Re-export commonly used items
pub use analysis::{
    ANALYSIS, AnalysisConfig, CONFLUENCE_TIMEFRAMES, ConfluenceSettings, DIVERGENCE_TIMEFRAMES,
    DivergenceSettings, SnapshotSettings,
};
pub use binance::BINANCE;
