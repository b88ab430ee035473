use serde::{Deserialize, Serialize};

use crate::domain::Timeframe;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
pub enum ExtremaKind {
    Peak,
    Valley,
}

/// A swing point found on one timeframe. `index` points into that timeframe's series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtremaPoint {
    pub index: usize,
    pub price: f64,
    pub kind: ExtremaKind,
    pub timeframe: Timeframe,
}
