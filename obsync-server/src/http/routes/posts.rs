//! Post endpoints

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};
use tracing::instrument;

use obsync_core::{DeleteOutcome, PostRequest, UpsertOutcome};

use crate::http::error::ApiError;
use crate::http::server::AppState;

/// POST /api/posts - create a post, or update it when `postId` is set
#[instrument(skip_all, fields(post_id))]
async fn upsert_post(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PostRequest>, JsonRejection>,
) -> Result<Json<UpsertOutcome>, ApiError> {
    let Json(req) = payload?;
    if let Some(id) = req.existing_post_id() {
        tracing::Span::current().record("post_id", id);
    }

    let outcome = state.posts.upsert(req).await?;
    Ok(Json(outcome))
}

/// DELETE /api/posts/{post_id} - remove a post and its attachments
#[instrument(skip(state))]
async fn delete_post(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<String>,
) -> Result<(StatusCode, Json<DeleteOutcome>), ApiError> {
    let outcome = state.posts.delete(&post_id).await?;
    let status = if outcome.deleted {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };
    Ok((status, Json(outcome)))
}

/// Post routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/posts", post(upsert_post))
        .route("/api/posts/{post_id}", delete(delete_post))
}
