use serde::{Deserialize, Serialize};

/// One OHLCV bar. `timestamp_ms` is the bar open time (epoch ms, UTC).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    #[serde(rename = "timestamp")]
    pub timestamp_ms: i64,
    #[serde(rename = "open")]
    pub open_price: f64,
    #[serde(rename = "high")]
    pub high_price: f64,
    #[serde(rename = "low")]
    pub low_price: f64,
    #[serde(rename = "close")]
    pub close_price: f64,
    pub volume: f64,
}

impl Candle {
    // A constructor for convenience
    pub fn new(
        timestamp_ms: i64,
        open_price: f64,
        high_price: f64,
        low_price: f64,
        close_price: f64,
        volume: f64,
    ) -> Self {
        Candle {
            timestamp_ms,
            open_price,
            high_price,
            low_price,
            close_price,
            volume,
        }
    }

    /// Wilder's true range. Without a previous close this is just high - low.
    pub fn true_range(&self, prev_close: Option<f64>) -> f64 {
        let high_low = self.high_price - self.low_price;
        match prev_close {
            Some(prev) => high_low
                .max((self.high_price - prev).abs())
                .max((self.low_price - prev).abs()),
            None => high_low,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_true_range_uses_gap_from_prev_close() {
        let candle = Candle::new(0, 105.0, 106.0, 104.0, 105.5, 1.0);
        assert_eq!(candle.true_range(None), 2.0);
        // Gap up: |high - prev_close| dominates
        assert_eq!(candle.true_range(Some(100.0)), 6.0);
        // Gap down: |low - prev_close| dominates
        assert_eq!(candle.true_range(Some(110.0)), 6.0);
        // Inside bar
        assert_eq!(candle.true_range(Some(105.0)), 2.0);
    }

    #[test]
    fn test_json_field_names() {
        let json = r#"{"timestamp":1700000000000,"open":1.0,"high":2.0,"low":0.5,"close":1.5,"volume":10.0}"#;
        let candle: Candle = serde_json::from_str(json).expect("valid candle json");
        assert_eq!(candle.timestamp_ms, 1_700_000_000_000);
        assert_eq!(candle.high_price, 2.0);
    }
}
