//! obsync-server: HTTP API over obsync-core
//!
//! Routes:
//! - `POST /api/posts` create or update a post with its attachments
//! - `DELETE /api/posts/{post_id}` remove a post and its attachments
//! - `GET /health` liveness

pub mod http;

pub use http::{build_router, run_server, ApiError, AppState, ServerError};
