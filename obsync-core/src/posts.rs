//! Post create/update/delete
//!
//! Coordinates the content and attachment stores for one request:
//! id assignment, category moves, attachment validation, embed rewriting
//! and the final writes.

use std::path::{Component, Path};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::attachments::{rewrite_references, AttachmentOutcome, AttachmentStore};
use crate::config::SyncConfig;
use crate::content::ContentStore;
use crate::error::{Result, SyncError};
use crate::locks::PostLocks;
use crate::models::{DeleteOutcome, PostRequest, UpsertOutcome};

/// Ids become file and directory names, so each must be exactly one
/// normal path segment
pub fn is_valid_post_id(post_id: &str) -> bool {
    if post_id.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(post_id).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[derive(Debug, Clone)]
pub struct PostService {
    content: ContentStore,
    attachments: AttachmentStore,
    locks: PostLocks,
}

impl PostService {
    pub fn new(content: ContentStore, attachments: AttachmentStore) -> Self {
        Self {
            content,
            attachments,
            locks: PostLocks::new(),
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(
            ContentStore::new(&config.content_root),
            AttachmentStore::from_config(config),
        )
    }

    pub fn content(&self) -> &ContentStore {
        &self.content
    }

    pub fn attachments(&self) -> &AttachmentStore {
        &self.attachments
    }

    /// Create a post (no `postId`) or update an existing one.
    ///
    /// Fails on blank title/date, an unknown `postId`, or a malformed
    /// attachment path. Category-move and attachment-write failures do not
    /// fail the call; they come back as warnings.
    pub async fn upsert(&self, request: PostRequest) -> Result<UpsertOutcome> {
        request.validate()?;
        info!(title = %request.title, "processing post");

        let categories = request.categories.as_ref();
        let mut warnings = Vec::new();

        let (post_id, previous_path, _guard) = match request.existing_post_id() {
            None => {
                let post_id = Uuid::new_v4().to_string();
                let guard = self.locks.acquire(&post_id).await;
                info!(post_id = %post_id, "creating new post");
                (post_id, None, guard)
            }
            Some(post_id) => {
                if !is_valid_post_id(post_id) {
                    return Err(SyncError::post_not_found(post_id));
                }
                let guard = self.locks.acquire(post_id).await;
                let current = self
                    .content
                    .find(post_id)
                    .await?
                    .ok_or_else(|| SyncError::post_not_found(post_id))?;
                info!(post_id = %post_id, "updating existing post");

                if self.content.needs_move(&current, categories).await {
                    info!(post_id = %post_id, "post needs category migration");
                    if let Err(e) = self
                        .content
                        .move_to_category(post_id, &current, categories)
                        .await
                    {
                        warn!(post_id = %post_id, error = %e, "category move failed, continuing with update");
                        warnings.push(format!("category move failed: {}", e));
                    }
                }
                (post_id.to_string(), Some(current), guard)
            }
        };

        debug!(post_id = %post_id, count = request.attachments.len(), "validating attachments");
        let validated = self.attachments.validate_all(&request.attachments)?;
        let references = self.attachments.reference_map(&request.attachments, &post_id);

        debug!(post_id = %post_id, "rewriting embeds");
        let body = rewrite_references(&request.content, &references);

        let frontmatter = request.frontmatter(&post_id);
        let saved = self
            .content
            .save(&post_id, &frontmatter, &body, categories)
            .await?;

        // A failed move can leave the old document behind next to the new one.
        if let Some(previous) = previous_path.filter(|p| *p != saved) {
            if tokio::fs::try_exists(&previous).await.unwrap_or(false) {
                match tokio::fs::remove_file(&previous).await {
                    Ok(()) => info!(post_id = %post_id, path = %previous.display(), "removed stale copy"),
                    Err(e) => {
                        warn!(post_id = %post_id, path = %previous.display(), error = %e, "failed to remove stale copy");
                        warnings.push(format!(
                            "stale copy left at {}: {}",
                            previous.display(),
                            e
                        ));
                    }
                }
            }
        }

        debug!(post_id = %post_id, count = validated.len(), "saving attachments");
        let outcomes = self.attachments.persist(&validated, &post_id).await;
        warnings.extend(outcomes.iter().filter_map(AttachmentOutcome::failure));

        if warnings.is_empty() {
            info!(post_id = %post_id, "post processed");
        } else {
            warn!(post_id = %post_id, warnings = warnings.len(), "post processed with warnings");
        }

        Ok(UpsertOutcome {
            post_id,
            status: "success".to_string(),
            warnings,
        })
    }

    /// Delete a post's document and every attachment directory it owns.
    ///
    /// Attachments are removed even when the document is already gone; the
    /// outcome reports `not_found` in that case.
    pub async fn delete(&self, post_id: &str) -> Result<DeleteOutcome> {
        info!(post_id = %post_id, "deleting post");

        if !is_valid_post_id(post_id) {
            warn!(post_id = %post_id, "rejecting malformed post id");
            return Ok(DeleteOutcome::not_found(post_id));
        }

        let _guard = self.locks.acquire(post_id).await;
        let deleted = self.content.delete(post_id).await?;

        let outcomes = self.attachments.delete_all(post_id).await;
        for failure in outcomes.iter().filter_map(AttachmentOutcome::failure) {
            warn!(post_id = %post_id, "{}", failure);
        }

        if !deleted {
            return Ok(DeleteOutcome::not_found(post_id));
        }

        info!(post_id = %post_id, "post deleted");
        Ok(DeleteOutcome::deleted(post_id))
    }
}
