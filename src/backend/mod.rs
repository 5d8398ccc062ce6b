//! Backend Module
//!
//! Server-side code for hearth: an Axum HTTP server with a REST messaging
//! API and a WebSocket realtime channel, persisted in PostgreSQL or in memory.
//!
//! # Architecture
//!
//! - **`server`** - configuration, application state, initialization
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`store`** - storage traits with in-memory and PostgreSQL backends
//! - **`messaging`** - direct/group messages, read receipts, conversations
//! - **`notifications`** - per-user notifications with realtime push
//! - **`realtime`** - connection registry, rooms, dispatcher, WebSocket transport
//! - **`auth`** - bearer token sessions and principal resolution
//! - **`middleware`** - request extractors
//! - **`error`** - backend error type and HTTP conversion
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs
//! ├── server/         - Config, state, init
//! ├── routes/         - Router and REST routes
//! ├── store/          - MemoryStore, PgStore
//! ├── messaging/      - Gate, service, projector, handlers
//! ├── notifications/  - Service and handlers
//! ├── realtime/       - Hub, dispatch, rooms, registry, socket
//! ├── auth/           - Sessions, principal
//! ├── middleware/     - AuthUser extractor
//! └── error/          - BackendError
//! ```
//!
//! # Thread Safety
//!
//! Stores are `Arc<dyn Trait>` objects behind async locks or a connection
//! pool. The realtime hub keeps its registry and rooms behind one mutex that
//! is never held across an `.await`; outbound frames go through bounded
//! per-connection queues.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Storage backends
pub mod store;

/// Direct and group messaging
pub mod messaging;

/// Notifications
pub mod notifications;

/// Realtime presence and delivery
pub mod realtime;

/// Backend error types
pub mod error;

/// Token sessions
pub mod auth;

/// Request extractors
pub mod middleware;

pub use error::BackendError;
pub use realtime::RealtimeHub;
pub use server::{create_app, AppState, ServerConfig};
