// Candle sources: Binance REST and offline JSON files
pub mod timeseries;

// Re-export commonly used types
pub use timeseries::bnapi_version::BinanceProvider;
pub use timeseries::SeriesProvider;
pub use timeseries::serde_version::JsonFileProvider;
