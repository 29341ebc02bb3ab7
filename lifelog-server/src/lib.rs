//! HTTP JSON API of LifeLog.
//!
//! All routes live under `/api` and require a session, either as the `lifelog_session` cookie
//! or an `Authorization: Bearer` header.
//!
//! | Method | Path             | Body / query                               |
//! |--------|------------------|--------------------------------------------|
//! | GET    | `/api/profile`   |                                            |
//! | POST   | `/api/profile`   | `{first_name, last_name, date_of_birth?, gender?, location?}` |
//! | GET    | `/api/timeboxes` | `?date=YYYY-MM-DD`                         |
//! | POST   | `/api/timeboxes` | `{time_block, description?}`               |
//! | DELETE | `/api/timeboxes` | `?id=<uuid>`                               |
//!
//! Successful responses are `{ "data": .., "message"?: .. }`, failures
//! `{ "error": .., "details"?: .. }`.

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use lifelog_lib::Repository;
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use config::Config;
use error::ServerError;
use routes::{profile, timeboxes};
use state::AppState;

pub async fn start_server() -> Result<(), ServerError> {
    info!("Initializing state...");
    let config = Config::load();
    let repo = Repository::new()?;
    let state = AppState::new(repo, config);

    let address = state.config.socket_addr();
    info!("Binding to {address}");

    let listener = TcpListener::bind(address)
        .await
        .map_err(|source| ServerError::Bind { address, source })?;
    info!("Server running on {address}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;

    info!("Server shut down");

    Ok(())
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/profile", get(profile::show).post(profile::update))
        .route(
            "/api/timeboxes",
            get(timeboxes::list)
                .post(timeboxes::save)
                .delete(timeboxes::remove),
        )
        .layer(cors(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors(config: &Config) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60));

    match config.cors_origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(e) => {
            warn!(
                "Invalid CORS origin `{}`: {e}, cross-origin requests are disabled",
                config.cors_origin
            );
            cors
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
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
}
