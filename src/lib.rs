//! A small voting site: list the latest questions, show one with its choices,
//! take a vote and show the results.
//!
//! Pages are rendered on the server with `tera`; questions and choices live
//! behind [`db::PollStore`], either PostgreSQL or an in-process store.
//!
//! | Method | Path | Page |
//! |---|---|---|
//! | GET | `/polls/` | latest questions |
//! | GET | `/polls/{id}/` | question and vote form |
//! | GET | `/polls/{id}/result/` | vote counts |
//! | POST | `/polls/{id}/vote/` | count a vote, redirect to the results |
use std::net::SocketAddr;
use std::time::Duration;

use axum_server::Handle;
use tokio::signal;
use tracing::info;

pub mod config;
pub mod db;
pub mod error;
pub mod fixtures;
pub mod handlers;
pub mod models;
pub mod poll;
pub mod routes;
pub mod state;
pub mod templates;

use config::Config;
use state::AppState;

pub async fn run(config: Config) -> anyhow::Result<()> {
    let store = db::connect(&config).await?;

    if let Some(path) = &config.fixture {
        fixtures::load_file(store.as_ref(), path).await?;
    }

    let address = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = routes::create_routes(AppState::new(store, config));

    let handle = Handle::new();
    tokio::spawn(shutdown_signal(handle.clone()));

    info!("Server running on {address}");
    axum_server::bind(address)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal(handle: Handle) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
    handle.graceful_shutdown(Some(Duration::from_secs(10)));
}
