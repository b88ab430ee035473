// Domain types and value objects
pub mod candle;
pub mod pair_interval;
pub mod timeframe;

// Re-export commonly used types
pub use candle::Candle;
pub use pair_interval::PairInterval;
pub use timeframe::Timeframe;
