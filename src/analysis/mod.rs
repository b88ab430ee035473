// Pure analysis: indicators, swing points, divergence and confluence
pub mod confluence;
pub mod divergence;
pub mod extrema;
pub mod indicators;
pub mod snapshot;

pub use confluence::{ConfluenceParams, cluster_levels, rank_levels, resolve_threshold};
pub use divergence::{DivergenceParams, detect_divergences};
pub use extrema::{Extrema, find_extrema, swing_points};
pub use snapshot::market_snapshot;
