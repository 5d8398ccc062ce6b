//! Messaging Module
//!
//! Direct and group messages: authorization, persistence through the store
//! traits, conversation projection and the REST handlers.
//!
//! - **`gate`** - pure authorization predicates
//! - **`service`** - `MessageService`, the REST core path
//! - **`projector`** - per-counterpart conversation summaries
//! - **`handlers`** - HTTP handlers under `/api/v1/messages`

pub mod gate;
pub mod handlers;
pub mod projector;
pub mod service;

pub use handlers::*;
pub use service::MessageService;
