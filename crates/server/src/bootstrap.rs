use std::sync::Arc;

use fareseer_core::config::{AppConfig, ArtifactsConfig, ConfigError};
use fareseer_core::{
    ArtifactError, LogisticBookingModel, PopularityLookup, PredictionService, Predictor,
};
use thiserror::Error;
use tracing::{info, warn};

pub struct Application {
    pub config: AppConfig,
    pub service: PredictionService,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("classifier artifact failed to load: {0}")]
    Model(#[source] ArtifactError),
    #[error("popularity artifact failed to load: {0}")]
    Popularity(#[source] ArtifactError),
}

/// Loads both artifacts once, before any request is served.
pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        model_path = %config.artifacts.model_path.display(),
        popularity_path = %config.artifacts.popularity_path.display(),
        "starting application bootstrap"
    );

    let popularity = load_popularity(&config.artifacts)?;
    let predictor = load_predictor(&config.artifacts)?;

    Ok(Application { service: PredictionService::new(Arc::new(popularity), predictor), config })
}

fn load_popularity(artifacts: &ArtifactsConfig) -> Result<PopularityLookup, BootstrapError> {
    let popularity =
        PopularityLookup::load(&artifacts.popularity_path).map_err(BootstrapError::Popularity)?;

    if !popularity.has_route_table() && !popularity.has_booking_origin_table() {
        warn!(
            event_name = "system.bootstrap.popularity_unavailable",
            correlation_id = "bootstrap",
            popularity_path = %artifacts.popularity_path.display(),
            "popularity tables unavailable; popularity features will default to 0.0"
        );
    } else {
        info!(
            event_name = "system.bootstrap.popularity_loaded",
            correlation_id = "bootstrap",
            routes = popularity.route_count(),
            booking_origins = popularity.booking_origin_count(),
            "popularity tables loaded"
        );
    }

    Ok(popularity)
}

fn load_predictor(artifacts: &ArtifactsConfig) -> Result<Predictor, BootstrapError> {
    match LogisticBookingModel::load(&artifacts.model_path) {
        Ok(model) => {
            info!(
                event_name = "system.bootstrap.model_loaded",
                correlation_id = "bootstrap",
                model_name = %model.name,
                threshold = model.threshold,
                "classifier artifact loaded"
            );
            Ok(Predictor::new(Arc::new(model)))
        }
        Err(error) if artifacts.require_model => Err(BootstrapError::Model(error)),
        Err(error) => {
            warn!(
                event_name = "system.bootstrap.model_unavailable",
                correlation_id = "bootstrap",
                error = %error,
                "classifier artifact unavailable; predictions will be refused"
            );
            Ok(Predictor::unloaded())
        }
    }
}
