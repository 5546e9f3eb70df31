//! Attachment path grammar
//!
//! Attachment paths sent by the Obsidian plugin follow
//! `media/<ext>/<segment>/<segment>-<13 digits>.<fileext>`. The whole path is
//! lowercased before matching, so callers never see the original case.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, SyncError};

/// Anchored at the start only: trailing characters after a match are ignored.
static PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^media/([a-z0-9]+)/([A-Za-z0-9_-]+)/([A-Za-z0-9_-]+)-([0-9]{13})\.([a-z0-9]+)")
        .expect("invalid attachment path regex")
});

/// Anchored at both ends.
static FULL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^media/([a-z0-9]+)/([A-Za-z0-9_-]+)/([A-Za-z0-9_-]+)-([0-9]{13})\.([a-z0-9]+)$")
        .expect("invalid attachment path regex")
});

/// Required shape, quoted back to clients in validation errors
pub const ATTACHMENT_PATH_PATTERN: &str = "media/{ext}/{postId}/{postId}-{13digit}.{ext}";

/// How much of the input must match the grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathMatching {
    /// The whole path must match
    #[default]
    Strict,
    /// A match at the start is enough; trailing characters are tolerated
    Prefix,
}

/// Components extracted from a valid attachment path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentPath {
    /// File-type bucket, e.g. `webp`
    pub ext: String,
    /// Post id segment embedded by the client. Not used for routing.
    pub embedded_post_id: String,
    /// 13-digit millisecond timestamp
    pub timestamp: String,
    pub file_ext: String,
}

impl AttachmentPath {
    /// Storage path relative to the static root for the given post
    pub fn storage_path(&self, post_id: &str) -> String {
        format!(
            "media/{}/{}/{}-{}.{}",
            self.ext, post_id, post_id, self.timestamp, self.file_ext
        )
    }

    /// Public URL under `url_prefix` (e.g. `/blog`)
    pub fn public_url(&self, url_prefix: &str, post_id: &str) -> String {
        format!(
            "{}/{}",
            url_prefix.trim_end_matches('/'),
            self.storage_path(post_id)
        )
    }
}

/// Validator/parser for attachment paths
#[derive(Debug, Clone, Copy, Default)]
pub struct PathGrammar {
    matching: PathMatching,
}

impl PathGrammar {
    pub fn new(matching: PathMatching) -> Self {
        Self { matching }
    }

    pub fn strict() -> Self {
        Self::new(PathMatching::Strict)
    }

    pub fn prefix() -> Self {
        Self::new(PathMatching::Prefix)
    }

    pub fn matching(&self) -> PathMatching {
        self.matching
    }

    fn regex(&self) -> &'static Regex {
        match self.matching {
            PathMatching::Strict => &*FULL_RE,
            PathMatching::Prefix => &*PREFIX_RE,
        }
    }

    /// True iff the lowercased path matches the grammar
    pub fn validate(&self, path: &str) -> bool {
        self.regex().is_match(&path.to_lowercase())
    }

    /// Extract path components, failing with `InvalidAttachmentPath`
    pub fn parse(&self, path: &str) -> Result<AttachmentPath> {
        let normalized = path.to_lowercase();
        let caps = self
            .regex()
            .captures(&normalized)
            .ok_or_else(|| SyncError::invalid_attachment_path(path))?;

        Ok(AttachmentPath {
            ext: caps[1].to_string(),
            embedded_post_id: caps[2].to_string(),
            timestamp: caps[4].to_string(),
            file_ext: caps[5].to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_paths() {
        let grammar = PathGrammar::strict();
        assert!(grammar.validate("media/webp/my-post/my-post-1234567890123.webp"));
        assert!(grammar.validate("media/png/x/x-1234567890123.png"));
        assert!(grammar.validate("media/img/post_1/other_2-0000000000000.jpeg"));
    }

    #[test]
    fn validation_ignores_case() {
        let grammar = PathGrammar::strict();
        assert!(grammar.validate("MEDIA/PNG/My-Post/My-Post-1234567890123.PNG"));
        assert!(grammar.validate("Media/Webp/ABC/abc-1700000000000.WebP"));
    }

    #[test]
    fn parse_extracts_components() {
        let parsed = PathGrammar::strict()
            .parse("media/WEBP/Post-A/Post-A-1700000000000.Webp")
            .unwrap();

        assert_eq!(parsed.ext, "webp");
        assert_eq!(parsed.embedded_post_id, "post-a");
        assert_eq!(parsed.timestamp, "1700000000000");
        assert_eq!(parsed.file_ext, "webp");
    }

    #[test]
    fn rejects_missing_media_prefix() {
        let grammar = PathGrammar::strict();
        assert!(!grammar.validate("png/x/x-1234567890123.png"));
        assert!(!grammar.validate("static/media/png/x/x-1234567890123.png"));
        assert!(matches!(
            grammar.parse("files/png/x/x-1234567890123.png"),
            Err(SyncError::InvalidAttachmentPath { .. })
        ));
    }

    #[test]
    fn rejects_missing_suffix() {
        let grammar = PathGrammar::strict();
        assert!(!grammar.validate("media/png/x/x.png"));
        assert!(!grammar.validate("media/png/x/x-1234567890123"));
        assert!(!grammar.validate("media/png/x/"));
    }

    #[test]
    fn rejects_short_and_long_timestamps() {
        let grammar = PathGrammar::strict();
        assert!(!grammar.validate("media/png/x/x-123456789012.png"));
        assert!(!grammar.validate("media/png/x/x-12345678901234.png"));
        assert!(matches!(
            grammar.parse("media/png/x/x-123.png"),
            Err(SyncError::InvalidAttachmentPath { .. })
        ));
    }

    #[test]
    fn rejects_path_traversal_segments() {
        let grammar = PathGrammar::prefix();
        assert!(!grammar.validate("media/png/../x-1234567890123.png"));
        assert!(!grammar.validate("media/png/a/b/x-1234567890123.png"));
    }

    #[test]
    fn strict_rejects_trailing_characters() {
        let path = "media/png/x/x-1234567890123.png.exe";
        assert!(!PathGrammar::strict().validate(path));
        assert!(PathGrammar::strict().parse(path).is_err());
    }

    #[test]
    fn prefix_mode_tolerates_trailing_characters() {
        let path = "media/png/x/x-1234567890123.png?v=2";
        assert!(PathGrammar::prefix().validate(path));

        let parsed = PathGrammar::prefix().parse(path).unwrap();
        assert_eq!(parsed.file_ext, "png");
        assert_eq!(parsed.timestamp, "1234567890123");
    }

    #[test]
    fn storage_path_and_url_use_request_post_id() {
        let parsed = PathGrammar::strict()
            .parse("media/png/client-id/client-id-1700000000000.png")
            .unwrap();

        assert_eq!(
            parsed.storage_path("p1"),
            "media/png/p1/p1-1700000000000.png"
        );
        assert_eq!(
            parsed.public_url("/blog/", "p1"),
            "/blog/media/png/p1/p1-1700000000000.png"
        );
    }
}
