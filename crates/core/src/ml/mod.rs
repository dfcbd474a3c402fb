//! Booking conversion classifier
//!
//! [`BookingClassifier`] is the seam between the pipeline and any trained
//! model. [`LogisticBookingModel`] is the native implementation, loaded from a
//! JSON artifact whose feature schema is checked against
//! [`NUMERIC_FEATURE_NAMES`] at construction.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::{ArtifactError, PredictionError};
use crate::features::{EngineeredFeatureVector, CATEGORICAL_FEATURE_NAMES, NUMERIC_FEATURE_NAMES};

/// A pretrained binary classifier over engineered booking features.
pub trait BookingClassifier: Send + Sync {
    /// Hard label: `true` when the booking is predicted to complete.
    fn predict(&self, features: &EngineeredFeatureVector) -> bool;

    /// Probability of the positive (booking completed) class.
    fn predict_probability(&self, features: &EngineeredFeatureVector) -> f64;
}

/// Label and positive-class probability for one request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClassifierOutput {
    pub label: u8,
    pub probability: f64,
}

/// Holds the process-wide classifier, if one was loaded at startup.
#[derive(Clone, Default)]
pub struct Predictor {
    classifier: Option<Arc<dyn BookingClassifier>>,
}

impl Predictor {
    pub fn new(classifier: Arc<dyn BookingClassifier>) -> Self {
        Self { classifier: Some(classifier) }
    }

    /// A predictor with no artifact; every call fails with `ServiceUnavailable`.
    pub fn unloaded() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn predict(
        &self,
        features: &EngineeredFeatureVector,
    ) -> Result<ClassifierOutput, PredictionError> {
        let classifier = self
            .classifier
            .as_ref()
            .ok_or_else(|| PredictionError::ServiceUnavailable("model_not_found".to_string()))?;

        let label = u8::from(classifier.predict(features));
        let probability = classifier.predict_probability(features);
        if !(0.0..=1.0).contains(&probability) {
            return Err(PredictionError::Classifier(format!(
                "positive-class probability {probability} is outside [0, 1]"
            )));
        }

        Ok(ClassifierOutput { label, probability })
    }
}

impl std::fmt::Debug for Predictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predictor").field("loaded", &self.is_loaded()).finish()
    }
}

/// Logistic regression artifact over the engineered schema.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogisticBookingModel {
    pub name: String,
    pub intercept: f64,
    /// Probability at or above which the hard label is positive.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Must equal [`NUMERIC_FEATURE_NAMES`], in order.
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    /// Per-column, per-category additive weights. Unseen categories contribute nothing.
    #[serde(default)]
    pub categorical_weights: HashMap<String, HashMap<String, f64>>,
}

fn default_threshold() -> f64 {
    0.5
}

impl LogisticBookingModel {
    /// Builds a model over the current schema and validates it.
    pub fn with_coefficients(
        name: impl Into<String>,
        intercept: f64,
        coefficients: Vec<f64>,
    ) -> Result<Self, ArtifactError> {
        let model = Self {
            name: name.into(),
            intercept,
            threshold: default_threshold(),
            feature_names: NUMERIC_FEATURE_NAMES.iter().map(|name| name.to_string()).collect(),
            coefficients,
            categorical_weights: HashMap::new(),
        };
        model.validate()?;
        Ok(model)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| ArtifactError::ReadFile { path: path.to_path_buf(), source })?;
        let model = Self::from_json_str(&raw)
            .map_err(|source| ArtifactError::Parse { path: path.to_path_buf(), source })?;
        model.validate()?;
        Ok(model)
    }

    /// Rejects schema drift and non-finite parameters.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        let schema_matches = self.feature_names.len() == NUMERIC_FEATURE_NAMES.len()
            && self.feature_names.iter().zip(NUMERIC_FEATURE_NAMES).all(|(a, b)| a == b);
        if !schema_matches {
            return Err(ArtifactError::SchemaMismatch {
                expected: NUMERIC_FEATURE_NAMES.iter().map(|name| name.to_string()).collect(),
                found: self.feature_names.clone(),
            });
        }

        if self.coefficients.len() != NUMERIC_FEATURE_NAMES.len() {
            return Err(ArtifactError::Invalid(format!(
                "expected {} coefficients, got {}",
                NUMERIC_FEATURE_NAMES.len(),
                self.coefficients.len()
            )));
        }

        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ArtifactError::Invalid("model parameters must be finite".to_string()));
        }

        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ArtifactError::Invalid("threshold must be within [0, 1]".to_string()));
        }

        for (column, weights) in &self.categorical_weights {
            if !CATEGORICAL_FEATURE_NAMES.contains(&column.as_str()) {
                return Err(ArtifactError::Invalid(format!(
                    "unknown categorical column `{column}`"
                )));
            }
            if weights.values().any(|weight| !weight.is_finite()) {
                return Err(ArtifactError::Invalid(format!(
                    "categorical weights for `{column}` must be finite"
                )));
            }
        }

        Ok(())
    }

    /// Sigmoid activation: 1 / (1 + e^(-z))
    fn sigmoid(z: f64) -> f64 {
        let z = z.clamp(-500.0, 500.0);
        1.0 / (1.0 + (-z).exp())
    }

    fn logit(&self, features: &EngineeredFeatureVector) -> f64 {
        let numeric: f64 = self
            .coefficients
            .iter()
            .zip(features.to_numeric_vector())
            .map(|(weight, value)| weight * value)
            .sum();

        let categorical: f64 = self
            .categorical_weights
            .iter()
            .filter_map(|(column, weights)| {
                features.categorical(column).and_then(|value| weights.get(value))
            })
            .sum();

        self.intercept + numeric + categorical
    }
}

impl BookingClassifier for LogisticBookingModel {
    fn predict(&self, features: &EngineeredFeatureVector) -> bool {
        self.predict_probability(features) >= self.threshold
    }

    fn predict_probability(&self, features: &EngineeredFeatureVector) -> f64 {
        Self::sigmoid(self.logit(features))
    }
}
