/**
 * Server Initialization
 *
 * 1. Pick the stores: PostgreSQL when `DATABASE_URL` connects, otherwise the
 *    in-memory store
 * 2. Build `AppState` (hub, services, token keys)
 * 3. Build the router
 */

use std::sync::Arc;

use axum::Router;

use crate::backend::auth::SessionKeys;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, ServerConfig};
use crate::backend::server::state::AppState;
use crate::backend::store::{MemoryStore, PgStore, Stores};

/// Build application state for `config`, connecting to the database if one
/// is configured and reachable
pub async fn build_state(config: &ServerConfig) -> AppState {
    let stores = match load_database(config.database_url.as_deref()).await {
        Some(pool) => {
            tracing::info!("[Server] Using PostgreSQL store");
            Stores::postgres(PgStore::new(pool))
        }
        None => {
            tracing::info!("[Server] Using in-memory store");
            Stores::memory(Arc::new(MemoryStore::new()))
        }
    };

    build_state_with(config, stores)
}

/// Build application state over explicit stores
pub fn build_state_with(config: &ServerConfig, stores: Stores) -> AppState {
    let sessions = SessionKeys::new(config.jwt_secret.clone(), config.jwt_expiry_days);
    AppState::new(stores, sessions, config.outbound_buffer)
}

/// Create and configure the Axum application
pub async fn create_app(config: &ServerConfig) -> Router<()> {
    tracing::info!("[Server] Initializing hearth backend");
    let state = build_state(config).await;
    let app = create_router(state, config);
    tracing::info!("[Server] Router configured");
    app
}
