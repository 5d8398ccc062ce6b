//! Authentication Module
//!
//! Account management lives elsewhere. This server only verifies the tokens
//! that service issues and turns them into a `Principal`.
//!
//! - **`sessions`** - JWT token creation and verification
//!
//! Both the REST extractor (`middleware::auth`) and the realtime handshake go
//! through [`resolve_principal`], so a token is accepted or rejected the same
//! way on either path.

/// JWT token generation and validation
pub mod sessions;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::store::UserDirectory;

pub use sessions::{Claims, SessionKeys};

/// An authenticated user identity attached to a request or connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub user_id: Uuid,
    pub is_admin: bool,
}

/// Verify `token` and load the user it names.
///
/// Fails with `Unauthenticated` when the token is invalid or expired, or when
/// the user no longer exists.
pub async fn resolve_principal(
    keys: &SessionKeys,
    users: &dyn UserDirectory,
    token: &str,
) -> Result<Principal, BackendError> {
    let user_id = keys.user_id_from_token(token).map_err(|e| {
        tracing::warn!("[Auth] Invalid token: {}", e);
        BackendError::unauthenticated("Invalid or expired token")
    })?;

    let user = users.find_user(user_id).await?.ok_or_else(|| {
        tracing::warn!("[Auth] Token for unknown user {}", user_id);
        BackendError::unauthenticated("Unknown user")
    })?;

    Ok(Principal {
        user_id: user.id,
        is_admin: user.is_admin,
    })
}
