/**
 * Router Configuration
 *
 * 1. `GET /socket` - realtime WebSocket
 * 2. `GET /health` - liveness and presence table sizes
 * 3. `/api/v1/...` - REST API (see `api_routes`)
 * 4. JSON 404 fallback
 *
 * CORS allows the configured `CLIENT_URL` origin; `TraceLayer` logs every
 * request.
 */

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    routing::get,
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::backend::realtime::handlers::{health_handler, socket_handler};
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::config::ServerConfig;
use crate::backend::server::state::AppState;

fn cors_layer(client_url: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    match HeaderValue::from_str(client_url) {
        Ok(origin) => layer.allow_origin(origin).allow_credentials(true),
        Err(e) => {
            tracing::warn!("[Server] CLIENT_URL '{}' is not a valid origin: {}", client_url, e);
            layer
        }
    }
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, config: &ServerConfig) -> Router<()> {
    let router = Router::new()
        .route("/socket", get(socket_handler))
        .route("/health", get(health_handler));

    let router = configure_api_routes(router);

    router
        .fallback(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({
                    "success": false,
                    "error": "Route not found",
                    "status": 404,
                })),
            )
        })
        .layer(cors_layer(&config.client_url))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
