use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use fareseer_cli::commands::{config, doctor, predict};
use fareseer_core::features::NUMERIC_FEATURE_NAMES;
use fareseer_core::LogisticBookingModel;
use serde_json::{json, Value};
use tempfile::TempDir;

#[test]
fn doctor_passes_with_both_artifacts() {
    let dir = TempDir::new().expect("tempdir");
    let (model, popularity) = write_artifacts(dir.path(), 1.5);

    with_env(&artifact_env(&model, &popularity), || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 0, "expected all checks to pass: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "pass");
        assert_eq!(payload["checks"][1]["name"], "classifier_artifact");
        assert_eq!(payload["checks"][1]["status"], "pass");
        assert_eq!(payload["checks"][2]["status"], "pass");
    });
}

#[test]
fn doctor_fails_when_required_model_is_missing() {
    let dir = TempDir::new().expect("tempdir");
    let missing = dir.path().join("absent.json");
    let popularity = dir.path().join("feature_mapping.json");

    with_env(&artifact_env(&missing, &popularity), || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 1);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "fail");
        assert_eq!(payload["checks"][1]["status"], "fail");
        assert_eq!(payload["checks"][2]["status"], "warn");
    });
}

#[test]
fn doctor_reports_config_failure_and_skips_artifacts() {
    with_env(&[("FARESEER_LOG_LEVEL", "chatty")], || {
        let result = doctor::run(false);
        assert_eq!(result.exit_code, 1);
        assert!(result.output.contains("- [fail] config_validation"));
        assert!(result.output.contains("- [skip] classifier_artifact"));
    });
}

#[test]
fn predict_returns_result_for_reference_booking() {
    let dir = TempDir::new().expect("tempdir");
    // sigmoid(1.5) = 0.817574...
    let (model, popularity) = write_artifacts(dir.path(), 1.5);
    let input = write_input(dir.path(), reference_booking());

    with_env(&artifact_env(&model, &popularity), || {
        let result = predict::run(&input);
        assert_eq!(result.exit_code, 0, "expected prediction success: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "predict");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["data"]["booking_prediction"], 1);
        assert_eq!(payload["data"]["booking_probability"], 0.8176);
        assert_eq!(payload["data"]["recommendation"], "High likelihood - No intervention needed");
        assert_eq!(payload["message"], "High likelihood - No intervention needed");
    });
}

#[test]
fn predict_rejects_invalid_booking() {
    let dir = TempDir::new().expect("tempdir");
    let (model, popularity) = write_artifacts(dir.path(), 0.0);
    let mut booking = reference_booking();
    booking["length_of_stay"] = json!(0);
    let input = write_input(dir.path(), booking);

    with_env(&artifact_env(&model, &popularity), || {
        let result = predict::run(&input);
        assert_eq!(result.exit_code, 5);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "validation");
        assert!(payload["message"].as_str().unwrap_or_default().contains("length_of_stay"));
    });
}

#[test]
fn predict_without_optional_model_is_service_unavailable() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_input(dir.path(), reference_booking());
    let missing = dir.path().join("absent.json");
    let popularity = dir.path().join("feature_mapping.json");
    let mut vars = artifact_env(&missing, &popularity);
    vars.push(("FARESEER_ARTIFACTS_REQUIRE_MODEL", "false".to_string()));

    with_env(&vars, || {
        let result = predict::run(&input);
        assert_eq!(result.exit_code, 6);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "service_unavailable");
        let message = payload["message"].as_str().unwrap_or_default();
        assert!(message.contains("model_not_found"), "unexpected message: {message}");
        assert!(message.contains("absent.json"), "load error should be reported: {message}");
    });
}

#[test]
fn predict_reports_unreadable_input() {
    let dir = TempDir::new().expect("tempdir");
    let (model, popularity) = write_artifacts(dir.path(), 0.0);

    with_env(&artifact_env(&model, &popularity), || {
        let result = predict::run(&dir.path().join("missing-booking.json"));
        assert_eq!(result.exit_code, 4);
        assert_eq!(parse_payload(&result.output)["error_class"], "input_read");
    });
}

#[test]
fn config_attributes_env_sources() {
    with_env(&[("FARESEER_SERVER_PORT", "9001".to_string())], || {
        let output = config::run();
        assert!(output.contains("- server.port = 9001 (source: env (FARESEER_SERVER_PORT))"));
        assert!(output.contains("- logging.level = info (source: default)"));
    });
}

fn reference_booking() -> Value {
    json!({
        "purchase_lead": 80,
        "length_of_stay": 1,
        "flight_hour": 23,
        "flight_day": 1,
        "route": "AKLKUL",
        "booking_origin": "Malaysia",
        "wants_extra_baggage": 1,
        "wants_preferred_seat": 1,
        "wants_in_flight_meals": 1,
        "flight_duration": 1.0,
        "num_passengers": 1
    })
}

fn write_artifacts(dir: &Path, intercept: f64) -> (PathBuf, PathBuf) {
    let model_path = dir.join("model.json");
    let model = LogisticBookingModel::with_coefficients(
        "cli-test",
        intercept,
        vec![0.0; NUMERIC_FEATURE_NAMES.len()],
    )
    .expect("valid model");
    fs::write(&model_path, serde_json::to_string(&model).expect("serialize")).expect("write model");

    let popularity_path = dir.join("feature_mapping.json");
    fs::write(
        &popularity_path,
        r#"{"route_popularity": {"AKLKUL": 0.01}, "booking_origin_popularity": {"Malaysia": 0.3}}"#,
    )
    .expect("write popularity");

    (model_path, popularity_path)
}

fn write_input(dir: &Path, booking: Value) -> PathBuf {
    let path = dir.join("booking.json");
    fs::write(&path, booking.to_string()).expect("write booking");
    path
}

fn artifact_env(model: &Path, popularity: &Path) -> Vec<(&'static str, String)> {
    vec![
        ("FARESEER_ARTIFACTS_MODEL_PATH", model.display().to_string()),
        ("FARESEER_ARTIFACTS_POPULARITY_PATH", popularity.display().to_string()),
    ]
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env<V: AsRef<str>>(vars: &[(&str, V)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "FARESEER_SERVER_BIND_ADDRESS",
        "FARESEER_SERVER_PORT",
        "FARESEER_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "FARESEER_ARTIFACTS_MODEL_PATH",
        "FARESEER_ARTIFACTS_POPULARITY_PATH",
        "FARESEER_ARTIFACTS_REQUIRE_MODEL",
        "FARESEER_LOGGING_LEVEL",
        "FARESEER_LOGGING_FORMAT",
        "FARESEER_LOG_LEVEL",
        "FARESEER_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value.as_ref());
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
