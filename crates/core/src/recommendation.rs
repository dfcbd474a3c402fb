use std::fmt;

use serde::{Deserialize, Serialize};

pub const HIGH_THRESHOLD: f64 = 0.7;
pub const MODERATE_THRESHOLD: f64 = 0.5;
pub const LOW_THRESHOLD: f64 = 0.3;

/// Intervention tier for a booking, decided by probability alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "High likelihood - No intervention needed")]
    High,
    #[serde(rename = "Moderate likelihood - Consider small incentive")]
    Moderate,
    #[serde(rename = "Low likelihood - Offer targeted promotion")]
    Low,
    #[serde(rename = "Very low likelihood - Consider aggressive discount")]
    VeryLow,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High likelihood - No intervention needed",
            Self::Moderate => "Moderate likelihood - Consider small incentive",
            Self::Low => "Low likelihood - Offer targeted promotion",
            Self::VeryLow => "Very low likelihood - Consider aggressive discount",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Threshold ladder, evaluated top-down with each band closed on its lower bound.
///
/// Callers must pass a probability in `[0, 1]`; the predictor rejects anything else.
pub fn classify(probability: f64) -> Recommendation {
    if probability >= HIGH_THRESHOLD {
        Recommendation::High
    } else if probability >= MODERATE_THRESHOLD {
        Recommendation::Moderate
    } else if probability >= LOW_THRESHOLD {
        Recommendation::Low
    } else {
        Recommendation::VeryLow
    }
}

#[cfg(test)]
mod tests {
    use super::{classify, Recommendation};

    #[test]
    fn bands_are_closed_below() {
        assert_eq!(classify(0.7), Recommendation::High);
        assert_eq!(classify(0.5), Recommendation::Moderate);
        assert_eq!(classify(0.3), Recommendation::Low);
        assert_eq!(classify(0.29999), Recommendation::VeryLow);
    }

    #[test]
    fn extremes_map_to_outer_bands() {
        assert_eq!(classify(1.0), Recommendation::High);
        assert_eq!(classify(0.0), Recommendation::VeryLow);
        assert_eq!(classify(0.69999), Recommendation::Moderate);
        assert_eq!(classify(0.49999), Recommendation::Low);
    }

    #[test]
    fn display_matches_serialized_text() {
        for tier in [
            Recommendation::High,
            Recommendation::Moderate,
            Recommendation::Low,
            Recommendation::VeryLow,
        ] {
            let serialized = serde_json::to_value(tier).expect("serializable");
            assert_eq!(serialized, tier.to_string());
        }
    }
}
