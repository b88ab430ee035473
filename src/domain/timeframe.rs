use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::utils::TimeUtils;

/// Candle widths understood by the scanner, labelled the way exchanges label them.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
pub enum Timeframe {
    #[strum(serialize = "1m")]
    #[serde(rename = "1m")]
    M1,
    #[strum(serialize = "3m")]
    #[serde(rename = "3m")]
    M3,
    #[strum(serialize = "5m")]
    #[serde(rename = "5m")]
    M5,
    #[strum(serialize = "15m")]
    #[serde(rename = "15m")]
    M15,
    #[strum(serialize = "30m")]
    #[serde(rename = "30m")]
    M30,
    #[strum(serialize = "1h")]
    #[serde(rename = "1h")]
    H1,
    #[strum(serialize = "2h")]
    #[serde(rename = "2h")]
    H2,
    #[strum(serialize = "4h")]
    #[serde(rename = "4h")]
    H4,
    #[strum(serialize = "6h")]
    #[serde(rename = "6h")]
    H6,
    #[strum(serialize = "8h")]
    #[serde(rename = "8h")]
    H8,
    #[strum(serialize = "12h")]
    #[serde(rename = "12h")]
    H12,
    #[strum(serialize = "1d")]
    #[serde(rename = "1d")]
    D1,
    #[strum(serialize = "3d")]
    #[serde(rename = "3d")]
    D3,
    #[strum(serialize = "1w")]
    #[serde(rename = "1w")]
    W1,
    // Upper-case M is the exchange convention for month
    #[strum(serialize = "1M")]
    #[serde(rename = "1M")]
    Mo1,
}

impl Timeframe {
    pub fn interval_ms(&self) -> i64 {
        match self {
            Timeframe::M1 => TimeUtils::MS_IN_MIN,
            Timeframe::M3 => TimeUtils::MS_IN_3_MIN,
            Timeframe::M5 => TimeUtils::MS_IN_5_MIN,
            Timeframe::M15 => TimeUtils::MS_IN_15_MIN,
            Timeframe::M30 => TimeUtils::MS_IN_30_MIN,
            Timeframe::H1 => TimeUtils::MS_IN_H,
            Timeframe::H2 => TimeUtils::MS_IN_2_H,
            Timeframe::H4 => TimeUtils::MS_IN_4_H,
            Timeframe::H6 => TimeUtils::MS_IN_6_H,
            Timeframe::H8 => TimeUtils::MS_IN_8_H,
            Timeframe::H12 => TimeUtils::MS_IN_12_H,
            Timeframe::D1 => TimeUtils::MS_IN_D,
            Timeframe::D3 => TimeUtils::MS_IN_3_D,
            Timeframe::W1 => TimeUtils::MS_IN_W,
            Timeframe::Mo1 => TimeUtils::MS_IN_1_M,
        }
    }

    /// Short timeframes get a tighter extrema window in the divergence scan.
    pub fn is_intraday_fast(&self) -> bool {
        matches!(self, Timeframe::M15 | Timeframe::H1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_labels_round_trip() {
        for tf in Timeframe::iter() {
            let label = tf.to_string();
            assert_eq!(Timeframe::from_str(&label).ok(), Some(tf), "label {}", label);
        }
    }

    #[test]
    fn test_month_and_minute_are_distinct() {
        assert_eq!(Timeframe::from_str("1M").ok(), Some(Timeframe::Mo1));
        assert_eq!(Timeframe::from_str("1m").ok(), Some(Timeframe::M1));
        assert!(Timeframe::from_str("7h").is_err());
    }

    #[test]
    fn test_ordering_follows_width() {
        let mut widths: Vec<i64> = Timeframe::iter().map(|tf| tf.interval_ms()).collect();
        let sorted = {
            let mut w = widths.clone();
            w.sort();
            w
        };
        assert_eq!(widths, sorted);
        widths.dedup();
        assert_eq!(widths.len(), Timeframe::iter().count());
    }
}
