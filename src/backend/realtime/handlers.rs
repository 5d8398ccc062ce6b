//! Realtime HTTP Handlers
//!
//! - `GET /socket` - WebSocket upgrade, token via `?token=` or bearer header
//! - `GET /api/v1/presence/{user_id}` - online status from the registry
//! - `GET /health` - liveness plus the size of the presence tables

use axum::{
    extract::{ws::WebSocketUpgrade, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::auth::{resolve_principal, Principal};
use crate::backend::error::BackendError;
use crate::backend::middleware::{bearer_token, ApiPath, AuthUser};
use crate::backend::realtime::hub::{HubStats, RealtimeHub};
use crate::backend::realtime::socket::run_connection;
use crate::backend::server::state::AppState;
use crate::shared::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct SocketParams {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PresenceResponse {
    pub user_id: Uuid,
    pub online: bool,
}

async fn authenticate_handshake(
    state: &AppState,
    params: &SocketParams,
    headers: &HeaderMap,
) -> Result<Principal, BackendError> {
    let token = params
        .token
        .as_deref()
        .filter(|token| !token.is_empty())
        .or_else(|| bearer_token(headers))
        .ok_or_else(|| BackendError::unauthenticated("Missing token"))?;

    resolve_principal(&state.sessions, state.stores.users.as_ref(), token).await
}

/// Upgrade to a realtime connection.
///
/// The token is checked before the upgrade; a bad or missing token is
/// answered with 401 and no socket is opened.
pub async fn socket_handler(
    State(state): State<AppState>,
    Query(params): Query<SocketParams>,
    headers: HeaderMap,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let principal = match authenticate_handshake(&state, &params, &headers).await {
        Ok(principal) => principal,
        Err(err) => {
            tracing::warn!("[Realtime] Handshake rejected: {}", err);
            return err.into_response();
        }
    };

    let upgrade = match upgrade {
        Ok(upgrade) => upgrade,
        Err(rejection) => return rejection.into_response(),
    };

    let hub: RealtimeHub = state.hub.clone();
    upgrade.on_upgrade(move |socket| run_connection(socket, hub, principal))
}

/// Whether a user currently has at least one live connection
pub async fn get_presence(
    AuthUser(_principal): AuthUser,
    State(hub): State<RealtimeHub>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> Json<ApiResponse<PresenceResponse>> {
    Json(ApiResponse::ok(PresenceResponse {
        user_id,
        online: hub.is_online(user_id),
    }))
}
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub stats: HubStats,
}

pub async fn health_handler(State(hub): State<RealtimeHub>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        stats: hub.stats(),
    })
}
