pub mod config;
pub mod domain;
pub mod errors;
pub mod features;
pub mod ml;
pub mod recommendation;
pub mod service;

pub use domain::booking::BookingRequest;
pub use domain::prediction::PredictionResult;
pub use errors::{ArtifactError, InterfaceError, PredictionError, ValidationError};
pub use features::{engineer, EngineeredFeatureVector, PopularityLookup};
pub use ml::{BookingClassifier, ClassifierOutput, LogisticBookingModel, Predictor};
pub use recommendation::{classify, Recommendation};
pub use service::PredictionService;
