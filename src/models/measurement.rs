use serde::{Deserialize, Serialize};

/// One performance reading for a page address
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub address: String,
    /// Performance score, 0 to 100
    pub score: f64,
    pub recorded_at: i64,
}

impl Measurement {
    pub fn new(address: String, score: f64, recorded_at: i64) -> Self {
        Self {
            address,
            score,
            recorded_at,
        }
    }
}
