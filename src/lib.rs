//! hearth - Messaging Backend Library
//!
//! hearth is a messaging backend: direct and group messages over a REST API,
//! read receipts, a derived conversation list, per-user notifications, and a
//! WebSocket channel for presence, typing indicators and live delivery.
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared with clients
//!   - Message, conversation and notification shapes
//!   - Realtime frames (`ClientEvent`, `ServerEvent`)
//!   - REST envelope and validation errors
//!
//! - **`backend`** - Server-side code
//!   - Axum HTTP server and WebSocket transport
//!   - Store traits with in-memory and PostgreSQL backends
//!   - Presence registry, rooms and the realtime dispatcher
//!
//! # Usage
//!
//! ```rust,no_run
//! use hearth::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::from_env()?;
//! let app = create_app(&config).await;
//! let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! - `shared::SharedError` for validation and serialization failures
//! - `backend::BackendError` for everything a request can fail with; it maps
//!   onto HTTP status codes and onto socket `error` frames

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
pub mod backend;
