/**
 * Session Tokens
 *
 * HS256 JWTs carrying only the user id. Issuing tokens belongs to the account
 * service; this server needs `create_token` for seeding and tests, and
 * `verify_token` for every authenticated request and realtime handshake.
 */

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Signing secret and token lifetime
#[derive(Clone)]
pub struct SessionKeys {
    secret: String,
    expiry_days: u64,
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("secret", &"<redacted>")
            .field("expiry_days", &self.expiry_days)
            .finish()
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

impl SessionKeys {
    pub fn new(secret: impl Into<String>, expiry_days: u64) -> Self {
        Self {
            secret: secret.into(),
            expiry_days,
        }
    }

    /// Create a JWT token for a user
    pub fn create_token(&self, user_id: Uuid) -> Result<String, jsonwebtoken::errors::Error> {
        let now = unix_now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.expiry_days * 24 * 60 * 60,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    /// Verify signature and expiry, returning the decoded claims
    pub fn verify_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let key = DecodingKey::from_secret(self.secret.as_bytes());
        let token_data = decode::<Claims>(token, &key, &Validation::default())?;
        Ok(token_data.claims)
    }

    /// Extract the user id from a valid token
    pub fn user_id_from_token(&self, token: &str) -> Result<Uuid, String> {
        let claims = self
            .verify_token(token)
            .map_err(|e| format!("Token verification failed: {}", e))?;
        Uuid::parse_str(&claims.sub).map_err(|e| format!("Invalid user ID in token: {}", e))
    }
}
