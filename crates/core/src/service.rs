use std::sync::Arc;

use crate::domain::booking::BookingRequest;
use crate::domain::prediction::{round_probability, PredictionResult};
use crate::errors::PredictionError;
use crate::features::{engineer, PopularityLookup};
use crate::ml::Predictor;
use crate::recommendation::classify;

/// Validate, engineer, predict and classify one booking request.
///
/// Holds only the artifacts loaded at startup, shared read-only, so a single
/// instance can serve any number of concurrent callers. Failures are returned
/// once and never retried here.
#[derive(Clone, Debug)]
pub struct PredictionService {
    popularity: Arc<PopularityLookup>,
    predictor: Predictor,
}

impl PredictionService {
    pub fn new(popularity: Arc<PopularityLookup>, predictor: Predictor) -> Self {
        Self { popularity, predictor }
    }

    pub fn predictor(&self) -> &Predictor {
        &self.predictor
    }

    pub fn popularity(&self) -> &PopularityLookup {
        &self.popularity
    }

    pub fn predict_booking(
        &self,
        request: &BookingRequest,
    ) -> Result<PredictionResult, PredictionError> {
        request.validate()?;

        let features = engineer(request, &self.popularity);
        let output = self.predictor.predict(&features)?;

        Ok(PredictionResult {
            booking_prediction: output.label,
            booking_probability: round_probability(output.probability),
            recommendation: classify(output.probability),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use super::PredictionService;
    use crate::domain::booking::BookingRequest;
    use crate::errors::{PredictionError, ValidationError};
    use crate::features::{EngineeredFeatureVector, PopularityLookup};
    use crate::ml::{BookingClassifier, Predictor};
    use crate::recommendation::{classify, Recommendation};

    /// Returns a fixed probability and records every vector it is shown.
    struct RecordingClassifier {
        probability: f64,
        seen: Mutex<Vec<EngineeredFeatureVector>>,
    }

    impl RecordingClassifier {
        fn new(probability: f64) -> Arc<Self> {
            Arc::new(Self { probability, seen: Mutex::new(Vec::new()) })
        }
    }

    impl BookingClassifier for RecordingClassifier {
        fn predict(&self, features: &EngineeredFeatureVector) -> bool {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(features.clone());
            }
            self.probability >= 0.5
        }

        fn predict_probability(&self, _features: &EngineeredFeatureVector) -> f64 {
            self.probability
        }
    }

    fn reference_request() -> BookingRequest {
        BookingRequest {
            purchase_lead: 80,
            length_of_stay: 1,
            flight_hour: 23,
            flight_day: 1,
            route: "AKLKUL".to_string(),
            booking_origin: "Malaysia".to_string(),
            wants_extra_baggage: true,
            wants_preferred_seat: true,
            wants_in_flight_meals: true,
            flight_duration: 1.0,
            num_passengers: 1,
            sales_channel: "Internet".to_string(),
            trip_type: "RoundTrip".to_string(),
        }
    }

    fn service(classifier: Arc<RecordingClassifier>) -> PredictionService {
        let popularity = PopularityLookup::new(
            Some(HashMap::from([("AKLKUL".to_string(), 0.015)])),
            Some(HashMap::from([("Malaysia".to_string(), 0.14)])),
        );
        PredictionService::new(Arc::new(popularity), Predictor::new(classifier))
    }

    #[test]
    fn reference_booking_flows_through_the_pipeline() {
        let classifier = RecordingClassifier::new(0.612_349);
        let result = service(classifier.clone())
            .predict_booking(&reference_request())
            .expect("prediction succeeds");

        assert_eq!(result.booking_prediction, 1);
        assert_eq!(result.booking_probability, 0.6123);
        assert_eq!(result.recommendation, Recommendation::Moderate);

        let seen = classifier.seen.lock().expect("lock");
        let vector = seen.first().expect("classifier was called");
        assert_eq!(vector.is_last_minute, 0);
        assert_eq!(vector.is_night_flight, 1);
        assert_eq!(vector.is_weekend_flight, 0);
        assert_eq!(vector.extra_count, 3);
        assert_eq!(vector.route_popularity, 0.015);
    }

    #[test]
    fn recommendation_depends_only_on_probability() {
        for probability in [0.0, 0.1, 0.3, 0.45, 0.5, 0.69, 0.7, 0.95, 1.0] {
            let mut request = reference_request();
            request.purchase_lead = 2;
            request.route = "ZZZZZZ".to_string();

            let result = service(RecordingClassifier::new(probability))
                .predict_booking(&request)
                .expect("prediction succeeds");
            assert_eq!(result.recommendation, classify(probability));
            assert!((0.0..=1.0).contains(&result.booking_probability));
        }
    }

    #[test]
    fn tier_uses_unrounded_probability() {
        let result = service(RecordingClassifier::new(0.699_96))
            .predict_booking(&reference_request())
            .expect("prediction succeeds");

        assert_eq!(result.booking_probability, 0.7);
        assert_eq!(result.recommendation, Recommendation::Moderate);
    }

    #[test]
    fn invalid_request_never_reaches_the_classifier() {
        let classifier = RecordingClassifier::new(0.9);
        let mut request = reference_request();
        request.flight_hour = 24;

        let error = service(classifier.clone()).predict_booking(&request).expect_err("rejected");

        assert!(matches!(
            error,
            PredictionError::Validation(ValidationError::OutOfRange { field: "flight_hour", .. })
        ));
        assert!(classifier.seen.lock().expect("lock").is_empty());
    }

    #[test]
    fn non_finite_flight_duration_never_reaches_the_classifier() {
        for duration in [f64::NAN, f64::INFINITY] {
            let classifier = RecordingClassifier::new(0.9);
            let mut request = reference_request();
            request.flight_duration = duration;

            let error = service(classifier.clone()).predict_booking(&request).expect_err("rejected");

            assert_eq!(
                error,
                PredictionError::Validation(ValidationError::NotFinite { field: "flight_duration" })
            );
            assert!(classifier.seen.lock().expect("lock").is_empty());
        }
    }

    #[test]
    fn empty_sales_channel_still_gets_a_prediction() {
        let classifier = RecordingClassifier::new(0.55);
        let mut request = reference_request();
        request.sales_channel = String::new();
        request.trip_type = String::new();

        let result = service(classifier.clone()).predict_booking(&request).expect("prediction");

        assert_eq!(result.recommendation, Recommendation::Moderate);
        let seen = classifier.seen.lock().expect("lock");
        assert_eq!(seen.first().map(|vector| vector.sales_channel.as_str()), Some(""));
    }

    #[test]
    fn missing_classifier_is_service_unavailable() {
        let service =
            PredictionService::new(Arc::new(PopularityLookup::unavailable()), Predictor::unloaded());

        let error = service.predict_booking(&reference_request()).expect_err("no model");
        assert!(matches!(error, PredictionError::ServiceUnavailable(_)));
    }

    #[test]
    fn concurrent_callers_share_one_service() {
        let service = service(RecordingClassifier::new(0.31));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = service.clone();
                std::thread::spawn(move || service.predict_booking(&reference_request()))
            })
            .collect();

        for handle in handles {
            let result = handle.join().expect("thread").expect("prediction");
            assert_eq!(result.recommendation, Recommendation::Low);
            assert_eq!(result.booking_prediction, 0);
        }
    }
}
