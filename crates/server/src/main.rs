mod app;
mod bootstrap;
mod health;
mod predict;

use anyhow::Result;
use fareseer_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use fareseer_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Logging has to exist before artifact loading so bootstrap events are visible.
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config)?;

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        classifier_loaded = app.service.predictor().is_loaded(),
        "fareseer-server started"
    );

    app::serve(&app.config.server, app.service).await?;

    tracing::info!(
        event_name = "system.server.stopped",
        correlation_id = "shutdown",
        "fareseer-server stopped"
    );

    Ok(())
}
