use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use fareseer_core::config::{AppConfig, LoadOptions};
use fareseer_core::{
    BookingRequest, LogisticBookingModel, PopularityLookup, PredictionError, PredictionService,
    Predictor,
};

use crate::commands::CommandResult;

const COMMAND: &str = "predict";

pub fn run(input: &Path) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let popularity = match PopularityLookup::load(&config.artifacts.popularity_path) {
        Ok(popularity) => popularity,
        Err(error) => return CommandResult::failure(COMMAND, "artifact_load", error.to_string(), 3),
    };

    let model = LogisticBookingModel::load(&config.artifacts.model_path);
    let (predictor, model_load_error) = match model {
        Ok(model) => (Predictor::new(Arc::new(model)), None),
        Err(error) if config.artifacts.require_model => {
            return CommandResult::failure(COMMAND, "artifact_load", error.to_string(), 3);
        }
        Err(error) => (Predictor::unloaded(), Some(error)),
    };

    let payload = match read_input(input) {
        Ok(payload) => payload,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "input_read",
                format!("could not read `{}`: {error}", input.display()),
                4,
            );
        }
    };

    let service = PredictionService::new(Arc::new(popularity), predictor);
    let outcome = BookingRequest::from_json_slice(&payload)
        .map_err(PredictionError::from)
        .and_then(|request| service.predict_booking(&request));

    match outcome {
        Ok(result) => match serde_json::to_value(&result) {
            Ok(data) => CommandResult::success_with_data(
                COMMAND,
                result.recommendation.as_str(),
                Some(data),
            ),
            Err(error) => CommandResult::failure(COMMAND, "serialization", error.to_string(), 1),
        },
        Err(error @ PredictionError::Validation(_)) => {
            CommandResult::failure(COMMAND, "validation", error.to_string(), 5)
        }
        Err(error @ PredictionError::ServiceUnavailable(_)) => {
            let message = match model_load_error {
                Some(load_error) => {
                    format!("{error} ({load_error}; artifacts.require_model is false)")
                }
                None => error.to_string(),
            };
            CommandResult::failure(COMMAND, "service_unavailable", message, 6)
        }
        Err(error @ PredictionError::Classifier(_)) => {
            CommandResult::failure(COMMAND, "classifier", error.to_string(), 7)
        }
    }
}

fn read_input(input: &Path) -> io::Result<Vec<u8>> {
    if input.as_os_str() == "-" {
        let mut buffer = Vec::new();
        io::stdin().read_to_end(&mut buffer)?;
        return Ok(buffer);
    }

    fs::read(input)
}
