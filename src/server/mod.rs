//! axum HTTP service: the generate-video acknowledgement plus the studio API.

pub mod error;
pub mod routes;

use anyhow::Context as _;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::ReelConfig;
use crate::studio::StudioHandle;

/// Shared state handed to every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub studio: StudioHandle,
}

/// Build the full router with request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::ack::router())
        .merge(routes::studio::router())
        .merge(routes::videos::router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Bind `cfg.bind` and serve until Ctrl-C.
pub async fn serve(cfg: &ReelConfig) -> anyhow::Result<()> {
    let studio = StudioHandle::from_config(cfg).context("failed to set up the studio")?;
    let app = router(AppState { studio });

    let listener = tokio::net::TcpListener::bind(cfg.bind)
        .await
        .with_context(|| format!("failed to bind {}", cfg.bind))?;
    tracing::info!("Starting server on {}", cfg.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
