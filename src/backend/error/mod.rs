//! Backend Error Module
//!
//! - **`types`** - `BackendError` and its status mapping
//! - **`conversion`** - `IntoResponse` for REST handlers
//!
//! Realtime handlers turn the same errors into an `error` frame sent to the
//! originating connection only.

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

pub use types::BackendError;
