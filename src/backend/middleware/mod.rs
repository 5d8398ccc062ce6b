//! Middleware Module
//!
//! - **`auth`** - `AuthUser` extractor and bearer-token parsing shared with
//!   the realtime handshake
//! - **`extract`** - `ApiPath` / `ApiJson`, rejecting with the JSON error body

pub mod auth;
pub mod extract;

pub use auth::{bearer_token, AuthUser};
pub use extract::{ApiJson, ApiPath};
