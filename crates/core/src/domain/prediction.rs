use serde::{Deserialize, Serialize};

use crate::recommendation::Recommendation;

/// Outcome of one prediction, shaped for the response body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Hard label from the classifier, `0` or `1`.
    pub booking_prediction: u8,
    /// Positive-class probability rounded to four decimal places.
    pub booking_probability: f64,
    pub recommendation: Recommendation,
}

/// Rounds to four decimal places from the exact binary value, so `0.00035`
/// (stored just below the tie) becomes `0.0003`.
pub fn round_probability(probability: f64) -> f64 {
    format!("{probability:.4}").parse().unwrap_or(probability)
}
