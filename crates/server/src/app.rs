use std::future::IntoFuture;
use std::time::Duration;

use axum::Router;
use fareseer_core::config::ServerConfig;
use fareseer_core::PredictionService;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::{health, predict};

pub fn router(service: PredictionService) -> Router {
    health::router(service.clone()).merge(predict::router(service))
}

/// Serves until Ctrl-C, then drains in-flight requests for at most
/// `graceful_shutdown_secs` before returning.
pub async fn serve(server: &ServerConfig, service: PredictionService) -> std::io::Result<()> {
    let address = format!("{}:{}", server.bind_address, server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(
        event_name = "system.server.listening",
        correlation_id = "bootstrap",
        bind_address = %address,
        "prediction endpoint started"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = shutdown_tx.send(true);
            }
            Err(error) => {
                error!(
                    event_name = "system.server.signal_error",
                    correlation_id = "shutdown",
                    error = %error,
                    "failed to listen for shutdown signal"
                );
                // Keep the sender alive so the server is not shut down by the drop.
                std::future::pending::<()>().await;
                drop(shutdown_tx);
            }
        }
    });

    let mut signal_rx = shutdown_rx.clone();
    let serving = axum::serve(listener, router(service))
        .with_graceful_shutdown(async move {
            let _ = signal_rx.changed().await;
            info!(
                event_name = "system.server.stopping",
                correlation_id = "shutdown",
                "draining in-flight requests"
            );
        })
        .into_future();

    let grace = Duration::from_secs(server.graceful_shutdown_secs);
    let mut deadline_rx = shutdown_rx;
    let deadline = async move {
        let _ = deadline_rx.changed().await;
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = serving => result?,
        () = deadline => {
            warn!(
                event_name = "system.server.forced_shutdown",
                correlation_id = "shutdown",
                graceful_shutdown_secs = server.graceful_shutdown_secs,
                "graceful shutdown window elapsed; dropping remaining connections"
            );
        }
    }

    Ok(())
}
