//! Realtime Module
//!
//! Presence, rooms and message fan-out over WebSockets.
//!
//! # Architecture
//!
//! - **`registry`** - principal to live connections; reports online/offline
//!   transitions
//! - **`rooms`** - `user:<id>` inboxes and canonical `chat:<lo>:<hi>` pair rooms
//! - **`dispatch`** - pure event handlers producing `Outbound` effects
//! - **`hub`** - shared state, per-connection queues, store re-reads
//! - **`socket`** - reader loop and writer task for one WebSocket
//! - **`handlers`** - upgrade endpoint and presence query
//!
//! ```text
//! realtime/
//! ├── mod.rs
//! ├── registry.rs
//! ├── rooms.rs
//! ├── dispatch.rs
//! ├── hub.rs
//! ├── socket.rs
//! └── handlers.rs
//! ```
//!
//! Messages are persisted over REST and only announced here by id. The hub
//! never takes message content from a socket frame.

pub mod dispatch;
pub mod handlers;
pub mod hub;
pub mod registry;
pub mod rooms;
pub mod socket;

pub use dispatch::{DeliveryStatus, Outbound, PresenceState, Target};
pub use handlers::{get_presence, health_handler, socket_handler, PresenceResponse};
pub use hub::{HubStats, RealtimeHub, DEFAULT_OUTBOUND_BUFFER};
pub use registry::{ConnectionId, ConnectionRegistry};
pub use rooms::{RoomId, RoomTable};
