/**
 * Backend Error Types
 *
 * One error enum for the whole backend. Each variant maps onto a REST status
 * code and onto the text of a realtime `error` frame.
 *
 * # Error Categories
 *
 * - `NotFound` - the entity is absent or no longer resolvable
 * - `Forbidden` - rejected by the authorization gate
 * - `InvalidArgument` - malformed pair/room arguments, empty content
 * - `Unauthenticated` - missing or invalid token
 * - `Storage` - the persistence layer failed; never retried here
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::shared::SharedError;

/// Backend-specific error types
#[derive(Debug, Error)]
pub enum BackendError {
    /// The requested entity does not exist (or was deleted)
    #[error("{entity} not found")]
    NotFound {
        /// What was looked up, e.g. "message"
        entity: String,
    },

    /// The principal may not perform this action
    #[error("{message}")]
    Forbidden {
        /// Human-readable error message
        message: String,
    },

    /// A request argument is malformed
    #[error("invalid {field}: {message}")]
    InvalidArgument {
        /// Offending field
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// Missing or invalid credentials
    #[error("{message}")]
    Unauthenticated {
        /// Human-readable error message
        message: String,
    },

    /// The persistence layer failed
    #[error("storage error: {message}")]
    Storage {
        /// Underlying driver error text
        message: String,
    },

    /// Validation or decoding error from the shared types
    #[error(transparent)]
    Shared(#[from] SharedError),
}

impl BackendError {
    pub fn not_found(entity: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// - `NotFound` - 404
    /// - `Forbidden` - 403
    /// - `InvalidArgument` and `Shared` - 400
    /// - `Unauthenticated` - 401
    /// - `Storage` - 500
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Self::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Shared(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Text shown to the client, both in REST bodies and realtime `error` frames.
    ///
    /// Storage failures are not described in detail to clients.
    pub fn client_message(&self) -> String {
        match self {
            Self::Storage { .. } => "Internal storage error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<sqlx::Error> for BackendError {
    fn from(err: sqlx::Error) -> Self {
        Self::storage(err.to_string())
    }
}
