//! Shared Module
//!
//! Types shared between the server and its clients: persisted data shapes,
//! realtime frames, the REST envelope and validation errors. Nothing in here
//! performs I/O.

/// REST response envelope
pub mod api;

/// Realtime socket frames
pub mod event;

/// Shared error types
pub mod error;

/// Messages, conversations and notifications
pub mod messaging;

pub use api::ApiResponse;
pub use error::SharedError;
pub use event::{ClientEvent, PresenceStatus, ServerEvent};
