use serde::{Deserialize, Serialize};

use crate::domain::timeframe::Timeframe;

/// A (symbol, timeframe) unit of work. Symbols may be written `BTC/USDT` or `BTCUSDT`.
#[derive(Serialize, Deserialize, Debug, Clone, Hash, Eq, PartialEq)]
pub struct PairInterval {
    pub symbol: String,
    pub timeframe: Timeframe,
}

impl PairInterval {
    pub fn new(symbol: impl Into<String>, timeframe: Timeframe) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
        }
    }

    /// The symbol as the Binance REST API wants it: no separator, upper case.
    pub fn bn_name(symbol: &str) -> String {
        symbol.replace('/', "").trim().to_uppercase()
    }

    /// Filesystem-safe form used by the offline JSON provider.
    pub fn file_stem(&self) -> String {
        format!("{}_{}", Self::bn_name(&self.symbol), self.timeframe)
    }
}

impl std::fmt::Display for PairInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} [{}]", self.symbol, self.timeframe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bn_name_and_file_stem() {
        assert_eq!(PairInterval::bn_name("eth/usdt"), "ETHUSDT");
        let pi = PairInterval::new("BTC/USDT", Timeframe::H4);
        assert_eq!(pi.file_stem(), "BTCUSDT_4h");
        assert_eq!(pi.to_string(), "BTC/USDT [4h]");
    }
}
