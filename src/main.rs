use crate::persistence::ExternalConnectivity;
use anyhow::Context;
use axum::extract::State;
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

mod api;
mod app_env;
mod db;
mod domain;
mod dto;
mod external_connections;
mod logging;
mod persistence;
mod routing_utils;

/// Address the HTTP server binds to
const LISTEN_ADDR: &str = "0.0.0.0:8082";

/// Global data store which is shared among HTTP routes
pub struct SharedData {
    pub ext_cxn: ExternalConnectivity,
}

/// Shorthand for the router state extractor every handler uses
pub type AppState = State<Arc<SharedData>>;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenv().ok();

    let telemetry = logging::setup_logging_and_tracing(
        logging::init_env_filter()?,
        logging::exporters_from_env()?,
    )?;

    let db_path = std::env::var(app_env::DB_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|_| db::default_database_path());
    let pool = db::connect_sqlx(&db_path).await?;
    db::run_migrations(&pool).await?;

    let shared_data = Arc::new(SharedData {
        ext_cxn: ExternalConnectivity::new(pool.clone()),
    });
    let router = api::build_router(shared_data);

    let listener = TcpListener::bind(LISTEN_ADDR)
        .await
        .with_context(|| format!("binding to {LISTEN_ADDR}"))?;
    info!("Server starting on {}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP requests")?;

    info!("Server stopped, closing database");
    pool.close().await;
    telemetry.shutdown();

    Ok(())
}

/// Resolves once the process receives SIGINT or, on unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Could not listen for Ctrl-C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!("Could not listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Interrupt received, shutting down"),
        _ = terminate => info!("Termination requested, shutting down"),
    }
}
