//! Route Configuration Module
//!
//! - **`router`** - top-level router, WebSocket route, CORS and tracing layers
//! - **`api_routes`** - REST endpoints under `/api/v1`

/// Main router creation
pub mod router;

/// API endpoint handlers
pub mod api_routes;

pub use router::create_router;
