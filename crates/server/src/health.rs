use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use fareseer_core::PredictionService;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Clone)]
pub struct HealthState {
    service: PredictionService,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub classifier: HealthCheck,
    pub popularity: HealthCheck,
    pub checked_at: String,
}

pub fn router(service: PredictionService) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/health", get(health))
        .with_state(HealthState { service })
}

pub async fn liveness() -> Json<Value> {
    Json(json!({ "health_check": "OK" }))
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let classifier = classifier_check(&state.service);
    let ready = classifier.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        classifier,
        popularity: popularity_check(&state.service),
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

fn classifier_check(service: &PredictionService) -> HealthCheck {
    if service.predictor().is_loaded() {
        HealthCheck { status: "ready", detail: "classifier artifact loaded".to_string() }
    } else {
        HealthCheck { status: "degraded", detail: "classifier artifact not loaded".to_string() }
    }
}

// Missing tables are a supported mode, so popularity never degrades readiness.
fn popularity_check(service: &PredictionService) -> HealthCheck {
    let popularity = service.popularity();
    HealthCheck {
        status: "ready",
        detail: format!(
            "routes: {}, booking origins: {}",
            table_summary(popularity.has_route_table(), popularity.route_count()),
            table_summary(popularity.has_booking_origin_table(), popularity.booking_origin_count()),
        ),
    }
}

fn table_summary(present: bool, count: usize) -> String {
    if present {
        count.to_string()
    } else {
        "unavailable".to_string()
    }
}
