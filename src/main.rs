//! rps-arena server entry point.
//!
//! Starts the Axum HTTP server with REST, WebSocket and SSE endpoints.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use rps_arena::api;
use rps_arena::app_state::AppState;
use rps_arena::config::{ArenaConfig, LogFormat};
use rps_arena::domain::EventBus;
use rps_arena::service::SessionService;
use rps_arena::store::{MemoryStore, PostgresStore, SessionStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ArenaConfig::from_env().context("invalid LISTEN_ADDR")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, "starting rps-arena");

    // Build store
    let store: Arc<dyn SessionStore> = if config.persistence_enabled {
        let postgres = PostgresStore::connect(&config)
            .await
            .context("connecting to the session database")?;
        postgres
            .migrate()
            .await
            .context("running session store migrations")?;
        tracing::info!(
            "using PostgreSQL session store; live events reach only clients of this instance"
        );
        Arc::new(postgres)
    } else {
        tracing::info!("using in-memory session store");
        Arc::new(MemoryStore::new())
    };

    // Build service layer
    let event_bus = EventBus::new(config.event_bus_capacity);
    let session_service = Arc::new(SessionService::new(store, event_bus));
    let app = api::build_app(AppState::new(session_service));

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
