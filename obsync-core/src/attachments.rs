//! Attachment storage
//!
//! Attachments are stored at `{static_root}/media/{ext}/{postId}/{postId}-{timestamp}.{file_ext}`
//! and served from `{media_url_prefix}/media/...`. The post id in the
//! client-supplied path is ignored; the id the post is stored under wins.
//!
//! Writes and deletes are best effort: each item reports its own outcome and
//! the caller decides what a partial failure means.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose, Engine as _};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tokio::fs;

use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::models::AttachmentInput;
use crate::path_grammar::{PathGrammar, PathMatching};

/// Obsidian embed: `![[name]]`, name runs up to the first `]`
static EMBED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[\[([^\]]+)\]\]").expect("invalid embed regex"));

/// Attachment that passed path validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedAttachment {
    /// Lowercased storage path as sent by the client
    pub path: String,
    /// Base64 payload
    pub data: String,
}

/// What happened to one attachment during a batch write or delete
#[derive(Debug)]
pub struct AttachmentOutcome {
    /// Client path for writes, directory for deletes
    pub source: String,
    pub result: Result<PathBuf>,
}

impl AttachmentOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Human-readable failure, `None` on success
    pub fn failure(&self) -> Option<String> {
        self.result
            .as_ref()
            .err()
            .map(|e| format!("attachment {}: {}", self.source, e))
    }
}

/// Replace every `![[name]]` whose name is in `references` with a markdown
/// image pointing at the mapped URL. Unknown names are left untouched.
pub fn rewrite_references(body: &str, references: &HashMap<String, String>) -> String {
    EMBED_RE
        .replace_all(body, |caps: &Captures| match references.get(&caps[1]) {
            Some(url) => format!("![]({})", url),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Decodes, writes and deletes attachment files
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    static_root: PathBuf,
    media_url_prefix: String,
    grammar: PathGrammar,
}

impl AttachmentStore {
    pub fn new(
        static_root: impl Into<PathBuf>,
        media_url_prefix: impl Into<String>,
        grammar: PathGrammar,
    ) -> Self {
        Self {
            static_root: static_root.into(),
            media_url_prefix: media_url_prefix.into(),
            grammar,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        let matching = if config.strict_attachment_paths {
            PathMatching::Strict
        } else {
            PathMatching::Prefix
        };
        Self::new(
            &config.static_root,
            &config.media_url_prefix,
            PathGrammar::new(matching),
        )
    }

    pub fn grammar(&self) -> &PathGrammar {
        &self.grammar
    }

    fn media_root(&self) -> PathBuf {
        self.static_root.join("media")
    }

    /// Check every complete attachment's path, stopping at the first bad one.
    ///
    /// Attachments missing a name, path or data are skipped.
    pub fn validate_all(&self, attachments: &[AttachmentInput]) -> Result<Vec<ValidatedAttachment>> {
        let mut validated = Vec::new();

        for attachment in attachments.iter().filter(|a| a.is_complete()) {
            if !self.grammar.validate(&attachment.path) {
                tracing::error!(path = %attachment.path, "invalid attachment path format");
                return Err(SyncError::invalid_attachment_path(&attachment.path));
            }
            validated.push(ValidatedAttachment {
                path: attachment.path.to_lowercase(),
                data: attachment.data.clone(),
            });
        }

        Ok(validated)
    }

    /// Map attachment display names to their public URLs under `post_id`.
    ///
    /// Entries whose path does not parse are logged and left out.
    pub fn reference_map(&self, attachments: &[AttachmentInput], post_id: &str) -> HashMap<String, String> {
        let mut references = HashMap::new();

        for attachment in attachments {
            if attachment.path.is_empty() || attachment.name.is_empty() {
                continue;
            }
            match self.grammar.parse(&attachment.path) {
                Ok(parsed) => {
                    tracing::debug!(name = %attachment.name, ?parsed, "mapped attachment");
                    references.insert(
                        attachment.name.clone(),
                        parsed.public_url(&self.media_url_prefix, post_id),
                    );
                }
                Err(e) => {
                    tracing::warn!(name = %attachment.name, error = %e, "skipping attachment reference");
                }
            }
        }

        references
    }

    async fn write_one(&self, attachment: &ValidatedAttachment, post_id: &str) -> Result<PathBuf> {
        let parsed = self.grammar.parse(&attachment.path)?;
        let target = self.static_root.join(parsed.storage_path(post_id));

        let bytes = decode_base64(&attachment.data).map_err(|e| {
            SyncError::file_operation(post_id, format!("invalid base64 for {}: {}", attachment.path, e))
        })?;

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| SyncError::file_operation(post_id, e))?;
        }
        fs::write(&target, bytes)
            .await
            .map_err(|e| SyncError::file_operation(post_id, e))?;

        Ok(target)
    }

    /// Decode and write each attachment under `post_id`. A failure on one
    /// item does not stop the others.
    pub async fn persist(&self, validated: &[ValidatedAttachment], post_id: &str) -> Vec<AttachmentOutcome> {
        let mut outcomes = Vec::with_capacity(validated.len());

        for attachment in validated {
            let result = self.write_one(attachment, post_id).await;
            match &result {
                Ok(path) => tracing::info!(post_id = %post_id, path = %path.display(), "wrote attachment"),
                Err(e) => tracing::error!(post_id = %post_id, path = %attachment.path, error = %e, "failed to save attachment"),
            }
            outcomes.push(AttachmentOutcome {
                source: attachment.path.clone(),
                result,
            });
        }

        outcomes
    }

    /// Remove `{ext}/{postId}` under every ext bucket. A missing media root
    /// or post directory is not an error.
    pub async fn delete_all(&self, post_id: &str) -> Vec<AttachmentOutcome> {
        let media_root = self.media_root();
        let mut outcomes = Vec::new();

        let mut entries = match fs::read_dir(&media_root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return outcomes,
            Err(e) => {
                tracing::error!(path = %media_root.display(), error = %e, "failed to read media root");
                outcomes.push(AttachmentOutcome {
                    source: media_root.display().to_string(),
                    result: Err(e.into()),
                });
                return outcomes;
            }
        };

        let mut post_dirs = Vec::new();
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    let post_dir = entry.path().join(post_id);
                    if is_dir(&entry.path()).await && is_dir(&post_dir).await {
                        post_dirs.push(post_dir);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(path = %media_root.display(), error = %e, "failed to list media buckets");
                    outcomes.push(AttachmentOutcome {
                        source: media_root.display().to_string(),
                        result: Err(e.into()),
                    });
                    break;
                }
            }
        }

        for post_dir in post_dirs {
            let result = fs::remove_dir_all(&post_dir)
                .await
                .map(|_| post_dir.clone())
                .map_err(|e| SyncError::file_operation(post_id, e));
            match &result {
                Ok(_) => tracing::info!(post_id = %post_id, path = %post_dir.display(), "deleted attachment directory"),
                Err(e) => tracing::error!(post_id = %post_id, path = %post_dir.display(), error = %e, "failed to delete attachment directory"),
            }
            outcomes.push(AttachmentOutcome {
                source: post_dir.display().to_string(),
                result,
            });
        }

        outcomes
    }
}

async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.map(|m| m.is_dir()).unwrap_or(false)
}

/// Standard base64, ignoring embedded whitespace and line breaks
/// Characters outside the standard alphabet (line breaks, data-URL noise)
/// are dropped before decoding; padding must still be correct.
fn decode_base64(data: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    let compact: String = data
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
        .collect();
    general_purpose::STANDARD.decode(compact)
}
