/**
 * Authentication Extractor
 *
 * Reads `Authorization: Bearer <token>`, verifies it and loads the user.
 * Handlers that take `AuthUser` are rejected with 401 before they run when
 * the header is missing or the token does not resolve to a known user.
 */

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use crate::backend::auth::{resolve_principal, Principal};
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Axum extractor for the authenticated principal
#[derive(Clone, Copy, Debug)]
pub struct AuthUser(pub Principal);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = BackendError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(|| {
            tracing::warn!("[Auth] Missing or malformed Authorization header");
            BackendError::unauthenticated("Missing bearer token")
        })?;

        let principal =
            resolve_principal(&state.sessions, state.stores.users.as_ref(), token).await?;
        Ok(AuthUser(principal))
    }
}
