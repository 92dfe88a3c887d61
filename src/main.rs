//! Town Board API
//!
//! One endpoint, many actions: registration and login, the post feed, and
//! moderation (roles, factions, bans, mutes, avatars). Every request maps
//! to a single SQL statement against PostgreSQL.

mod action;
mod auth;
mod config;
mod dispatch;
mod error;
mod models;
mod routes;
mod state;
mod store;

use crate::config::Settings;
use crate::routes::create_router;
use crate::state::AppState;
use crate::store::PgStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber for structured logging
    init_tracing();

    info!("Starting Town Board API...");

    // Load configuration
    let settings = Settings::load()?;
    info!("Configuration loaded successfully");

    if settings.auth.admin_code.is_none() {
        warn!("ADMIN_CODE not set, admin self-registration is disabled");
    }
    info!("Password storage: {:?}", settings.auth.password_storage);

    let store = PgStore::connect(&settings.database).await?;

    // Create tables if they don't exist
    if let Err(e) = store.ensure_schema().await {
        warn!("Warning creating tables: {}", e);
    }

    let state = Arc::new(AppState::new(Arc::new(store), settings.auth.clone()));

    // Build the router
    let app = create_router(state);

    // Create socket address
    let addr = SocketAddr::from((settings.server.host, settings.server.port));

    info!("Server listening on http://{}", addr);
    info!("   GET    ?action=users | posts");
    info!("   POST   ?action=register | login | create-post");
    info!("   PUT    ?action=update-role | update-faction | ban | mute | update-avatar");
    info!("   DELETE ?userId=<id>");

    // Create TCP listener and serve
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing with structured logging; `LOG_FORMAT=json` switches to JSON lines
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,town_board_api=debug,tower_http=debug"));

    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry
            .with(fmt::layer().json().with_current_span(true))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .compact(),
            )
            .init();
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        },
    }
}
