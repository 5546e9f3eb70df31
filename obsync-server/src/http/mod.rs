//! HTTP server layer
//!
//! Axum server with:
//! - CORS (localhost and the Obsidian app by default)
//! - Request tracing
//! - Body limit sized for base64 attachments
//! - Graceful shutdown
//! - JSON error responses

pub mod error;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, run_server, AppState, ServerError};
