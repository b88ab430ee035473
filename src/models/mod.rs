// Domain models produced and consumed by the analysis engines
// These modules hold plain data, no fetching or formatting

pub mod divergence;
pub mod extrema;
pub mod level;
pub mod snapshot;
pub mod timeseries;

// Re-export key types for convenience
pub use divergence::{DivergenceEvent, DivergenceKind, DivergenceStatus};
pub use extrema::{ExtremaKind, ExtremaPoint};
pub use level::{Level, LevelReport, ThresholdSource, ZoneKind};
pub use snapshot::{MarketSnapshot, TrendBias};
pub use timeseries::OhlcvTimeSeries;
