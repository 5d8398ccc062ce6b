//! Server Module
//!
//! - **`config`** - `ServerConfig` from the environment, database loading
//! - **`state`** - `AppState` and its `FromRef` implementations
//! - **`init`** - store selection and app creation
//!
//! # Initialization Flow
//!
//! 1. `ServerConfig::from_env()`
//! 2. `load_database()`; falls back to the in-memory store
//! 3. `AppState::new()` wires the hub and services over the stores
//! 4. `create_router()` mounts REST, WebSocket, CORS and tracing layers

/// Server configuration loading
pub mod config;

/// Application state management
pub mod state;

/// Server initialization
pub mod init;

pub use config::{ConfigError, ServerConfig};
pub use init::{build_state, build_state_with, create_app};
pub use state::AppState;
