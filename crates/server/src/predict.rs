//! Prediction endpoint.
//!
//! - `POST /predict` (and `/predict/`) takes a booking request JSON body and
//!   returns `{booking_prediction, booking_probability, recommendation}`.
//!
//! Failures carry `{error, message, correlation_id}`: 422 for rejected
//! requests, 503 when no classifier is loaded, 500 for classifier faults.

use axum::{body::Bytes, extract::State, http::StatusCode, routing::post, Json, Router};
use fareseer_core::{
    BookingRequest, InterfaceError, PredictionError, PredictionResult, PredictionService,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct PredictState {
    service: PredictionService,
}

#[derive(Debug, Serialize)]
pub struct PredictError {
    pub error: String,
    pub message: &'static str,
    pub correlation_id: String,
}

pub fn router(service: PredictionService) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .route("/predict/", post(predict))
        .with_state(PredictState { service })
}

pub async fn predict(
    State(state): State<PredictState>,
    body: Bytes,
) -> Result<Json<PredictionResult>, (StatusCode, Json<PredictError>)> {
    let correlation_id = Uuid::new_v4().to_string();

    let outcome = BookingRequest::from_json_slice(&body)
        .map_err(PredictionError::from)
        .and_then(|request| state.service.predict_booking(&request));

    match outcome {
        Ok(result) => {
            info!(
                event_name = "prediction.completed",
                correlation_id = %correlation_id,
                booking_prediction = result.booking_prediction,
                booking_probability = result.booking_probability,
                recommendation = %result.recommendation,
                "booking prediction served"
            );
            Ok(Json(result))
        }
        Err(error) => Err(reject(error.into_interface(correlation_id))),
    }
}

fn reject(error: InterfaceError) -> (StatusCode, Json<PredictError>) {
    let status = match error {
        InterfaceError::BadRequest { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };

    warn!(
        event_name = "prediction.rejected",
        correlation_id = %error.correlation_id(),
        status = status.as_u16(),
        error = %error,
        "booking prediction failed"
    );

    (
        status,
        Json(PredictError {
            error: error.to_string(),
            message: error.user_message(),
            correlation_id: error.correlation_id().to_string(),
        }),
    )
}
