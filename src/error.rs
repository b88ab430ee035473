//! Error taxonomy for the scan engines.
//!
//! None of these are fatal: the scanner records them per (symbol, timeframe)
//! unit and moves on to the next one.

use thiserror::Error;

use crate::domain::Timeframe;

#[derive(Debug, Clone, Error)]
pub enum ScanError {
    /// Provider failed, or returned an empty/too-short series.
    #[error("no usable data for {symbol} [{timeframe}]: {reason}")]
    DataUnavailable {
        symbol: String,
        timeframe: Timeframe,
        reason: String,
    },

    /// Not enough warm-up bars for an indicator.
    #[error("{indicator} undefined: needs {required} bars, got {provided}")]
    IndicatorUndefined {
        indicator: &'static str,
        required: usize,
        provided: usize,
    },

    /// Prices that make a relative comparison meaningless (zero, negative, NaN).
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl ScanError {
    pub fn data_unavailable(
        symbol: &str,
        timeframe: Timeframe,
        reason: impl std::fmt::Display,
    ) -> Self {
        ScanError::DataUnavailable {
            symbol: symbol.to_string(),
            timeframe,
            reason: reason.to_string(),
        }
    }
}

pub type ScanResult<T> = std::result::Result<T, ScanError>;
