//! Structured error types for obsync-core.
//!
//! Validation failures carry the offending input so the HTTP layer can echo
//! it back. File-system failures on single documents are wrapped in
//! `FileOperation` with the post they belong to.

use std::io;
use thiserror::Error;

/// Main error type for post and attachment operations
#[derive(Error, Debug)]
pub enum SyncError {
    /// Attachment path does not follow `media/{ext}/{id}/{id}-{13 digits}.{ext}`
    #[error("Invalid attachment path format: {path}")]
    InvalidAttachmentPath { path: String },

    /// Required frontmatter or request field missing or blank
    #[error("Missing required frontmatter field: {field}")]
    MissingRequiredField { field: String },

    /// Update or lookup of a post id that is not stored
    #[error("No article found for postId: {post_id}")]
    PostNotFound { post_id: String },

    /// Writing, moving or deleting a post document failed
    #[error("File operation failed for post {post_id}: {reason}")]
    FileOperation { post_id: String, reason: String },

    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {reason}")]
    Config { reason: String },
}

/// Result type alias for obsync-core operations
pub type Result<T> = std::result::Result<T, SyncError>;

impl SyncError {
    pub fn invalid_attachment_path(path: impl Into<String>) -> Self {
        Self::InvalidAttachmentPath { path: path.into() }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingRequiredField {
            field: field.into(),
        }
    }

    pub fn post_not_found(post_id: impl Into<String>) -> Self {
        Self::PostNotFound {
            post_id: post_id.into(),
        }
    }

    pub fn file_operation(post_id: impl Into<String>, reason: impl ToString) -> Self {
        Self::FileOperation {
            post_id: post_id.into(),
            reason: reason.to_string(),
        }
    }

    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SyncError::post_not_found("abc");
        assert_eq!(err.to_string(), "No article found for postId: abc");

        let err = SyncError::missing_field("title");
        assert_eq!(err.to_string(), "Missing required frontmatter field: title");

        let err = SyncError::file_operation("abc", "disk full");
        assert!(err.to_string().contains("post abc"));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err: SyncError = io_err.into();

        assert!(matches!(err, SyncError::Io { .. }));
    }
}
