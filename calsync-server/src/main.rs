mod routes;
mod singleton;
mod state;

use anyhow::Result;
use axum::Router;
use calsync_core::EventSyncController;
use calsync_core::config::SyncConfig;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = SyncConfig::load()?;

    // Ensure only one instance is running
    let _lock = singleton::acquire_lock(config.server_port)?;
    let mut controller = EventSyncController::new(
        config.provider(),
        config.tz()?,
        config.scope_id.clone(),
    );

    let opened = controller.on_view_opened().await;
    match &opened.notification {
        Some(notification) if opened.is_error() => warn!("{}", notification.message),
        Some(notification) => info!("{}", notification.message),
        None => info!(events = controller.len(), "events loaded"),
    }

    let state = AppState::new(controller);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(routes::events::router())
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([127, 0, 0, 1], config.server_port));
    info!("calsync-server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
