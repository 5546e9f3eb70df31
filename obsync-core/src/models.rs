//! Request and response models for the post API
//!
//! Field names on the wire follow the Obsidian plugin and Hugo's PaperMod
//! theme (`postId`, `showToc`, `ShowReadingTime`, ...).

use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};
use crate::frontmatter::{FieldValue, Frontmatter};

/// `categories` arrives either as a single string or a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Categories {
    One(String),
    Many(Vec<String>),
}

impl From<&Categories> for FieldValue {
    fn from(categories: &Categories) -> Self {
        match categories {
            Categories::One(s) => FieldValue::Text(s.clone()),
            Categories::Many(items) => FieldValue::List(items.clone()),
        }
    }
}

/// Attachment as sent by the plugin. Only lives for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentInput {
    /// Display filename, the key used in `![[name]]` embeds
    #[serde(default)]
    pub name: String,
    /// `media/{ext}/{postId}/{postId}-{13digit}.{ext}`, any case
    #[serde(default)]
    pub path: String,
    /// Base64-encoded file bytes
    #[serde(default)]
    pub data: String,
}

impl AttachmentInput {
    /// All of name, path and data are non-empty
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.path.is_empty() && !self.data.is_empty()
    }
}

/// Hugo display flags written verbatim into the header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayFlags {
    pub draft: bool,
    #[serde(rename = "showToc")]
    pub show_toc: bool,
    #[serde(rename = "TocOpen")]
    pub toc_open: bool,
    pub hidemeta: bool,
    pub comments: bool,
    #[serde(rename = "disableHLJS")]
    pub disable_hljs: bool,
    #[serde(rename = "disableShare")]
    pub disable_share: bool,
    #[serde(rename = "hideSummary")]
    pub hide_summary: bool,
    #[serde(rename = "searchHidden")]
    pub search_hidden: bool,
    #[serde(rename = "ShowReadingTime")]
    pub show_reading_time: bool,
    #[serde(rename = "ShowBreadCrumbs")]
    pub show_bread_crumbs: bool,
    #[serde(rename = "ShowPostNavLinks")]
    pub show_post_nav_links: bool,
    #[serde(rename = "ShowWordCount")]
    pub show_word_count: bool,
    #[serde(rename = "ShowRssButtonInSectionTermList")]
    pub show_rss_button_in_section_term_list: bool,
    #[serde(rename = "UseHugoToc")]
    pub use_hugo_toc: bool,
}

impl Default for DisplayFlags {
    fn default() -> Self {
        Self {
            draft: false,
            show_toc: true,
            toc_open: false,
            hidemeta: false,
            comments: true,
            disable_hljs: false,
            disable_share: false,
            hide_summary: false,
            search_hidden: false,
            show_reading_time: true,
            show_bread_crumbs: true,
            show_post_nav_links: true,
            show_word_count: true,
            show_rss_button_in_section_term_list: false,
            use_hugo_toc: true,
        }
    }
}

impl DisplayFlags {
    /// Header keys and values in wire order
    pub fn entries(&self) -> [(&'static str, bool); 15] {
        [
            ("draft", self.draft),
            ("showToc", self.show_toc),
            ("TocOpen", self.toc_open),
            ("hidemeta", self.hidemeta),
            ("comments", self.comments),
            ("disableHLJS", self.disable_hljs),
            ("disableShare", self.disable_share),
            ("hideSummary", self.hide_summary),
            ("searchHidden", self.search_hidden),
            ("ShowReadingTime", self.show_reading_time),
            ("ShowBreadCrumbs", self.show_bread_crumbs),
            ("ShowPostNavLinks", self.show_post_nav_links),
            ("ShowWordCount", self.show_word_count),
            ("ShowRssButtonInSectionTermList", self.show_rss_button_in_section_term_list),
            ("UseHugoToc", self.use_hugo_toc),
        ]
    }
}

fn default_author() -> String {
    "Anonymous".to_string()
}

/// Body of `POST /api/posts`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRequest {
    pub title: String,
    /// ISO-8601, passed through untouched
    pub date: String,
    /// Markdown body
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub categories: Option<Categories>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Empty or absent for a new post
    #[serde(default, rename = "postId")]
    pub post_id: Option<String>,
    #[serde(flatten)]
    pub display: DisplayFlags,
    #[serde(default)]
    pub attachments: Vec<AttachmentInput>,
}

impl PostRequest {
    /// Minimal request with defaults for everything but title and date
    pub fn new(title: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            date: date.into(),
            content: String::new(),
            author: default_author(),
            description: None,
            categories: None,
            tags: None,
            post_id: None,
            display: DisplayFlags::default(),
            attachments: Vec::new(),
        }
    }

    /// Reject blank title or date
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(SyncError::missing_field("title"));
        }
        if self.date.trim().is_empty() {
            return Err(SyncError::missing_field("date"));
        }
        Ok(())
    }

    /// The requested post id, if one was given and is not blank
    pub fn existing_post_id(&self) -> Option<&str> {
        self.post_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Header fields for this request stored under `post_id`
    pub fn frontmatter(&self, post_id: &str) -> Frontmatter {
        let mut fm = Frontmatter::new();
        fm.set("title", self.title.as_str())
            .set("date", self.date.as_str())
            .set("author", self.author.as_str())
            .set("description", self.description.clone())
            .set(
                "categories",
                self.categories
                    .as_ref()
                    .map(FieldValue::from)
                    .unwrap_or(FieldValue::Null),
            )
            .set("tags", self.tags.clone())
            .set("postId", post_id);
        for (key, value) in self.display.entries() {
            fm.set(key, value);
        }
        fm
    }
}

/// Result of a create/update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertOutcome {
    pub post_id: String,
    pub status: String,
    /// Non-fatal problems: failed category moves, attachments not written
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl UpsertOutcome {
    /// Everything requested was written
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Result of a delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub deleted: bool,
    pub post_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DeleteOutcome {
    pub fn deleted(post_id: impl Into<String>) -> Self {
        Self {
            deleted: true,
            post_id: post_id.into(),
            status: "success".to_string(),
            message: None,
        }
    }

    pub fn not_found(post_id: impl Into<String>) -> Self {
        Self {
            deleted: false,
            post_id: post_id.into(),
            status: "not_found".to_string(),
            message: Some("Post not found".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minimal_request_gets_defaults() {
        let req: PostRequest =
            serde_json::from_value(json!({ "title": "T", "date": "2024-01-01" })).unwrap();

        assert_eq!(req.author, "Anonymous");
        assert_eq!(req.content, "");
        assert!(req.attachments.is_empty());
        assert!(req.display.show_toc);
        assert!(!req.display.draft);
        assert!(req.display.use_hugo_toc);
        assert_eq!(req.existing_post_id(), None);
    }

    #[test]
    fn categories_accept_string_or_list() {
        let req: PostRequest = serde_json::from_value(
            json!({ "title": "T", "date": "d", "categories": "My Blog" }),
        )
        .unwrap();
        assert_eq!(req.categories, Some(Categories::One("My Blog".into())));

        let req: PostRequest = serde_json::from_value(
            json!({ "title": "T", "date": "d", "categories": ["Tech", "Other"] }),
        )
        .unwrap();
        assert_eq!(
            req.categories,
            Some(Categories::Many(vec!["Tech".into(), "Other".into()]))
        );
    }

    #[test]
    fn display_flags_use_wire_names() {
        let req: PostRequest = serde_json::from_value(json!({
            "title": "T",
            "date": "d",
            "draft": true,
            "showToc": false,
            "ShowRssButtonInSectionTermList": true,
        }))
        .unwrap();

        assert!(req.display.draft);
        assert!(!req.display.show_toc);
        assert!(req.display.show_rss_button_in_section_term_list);
    }

    #[test]
    fn blank_post_id_means_new() {
        let mut req = PostRequest::new("T", "d");
        req.post_id = Some("   ".into());
        assert_eq!(req.existing_post_id(), None);

        req.post_id = Some("abc".into());
        assert_eq!(req.existing_post_id(), Some("abc"));
    }

    #[test]
    fn validate_rejects_blank_title_and_date() {
        let req = PostRequest::new(" ", "2024-01-01");
        assert!(matches!(
            req.validate(),
            Err(SyncError::MissingRequiredField { ref field }) if field == "title"
        ));

        let req = PostRequest::new("T", "");
        assert!(matches!(
            req.validate(),
            Err(SyncError::MissingRequiredField { ref field }) if field == "date"
        ));
    }

    #[test]
    fn frontmatter_order_and_values() {
        let mut req = PostRequest::new("Hello", "2024-01-01");
        req.categories = Some(Categories::One("Blog".into()));
        req.tags = Some(vec!["a".into()]);
        req.content = "ignored".into();

        let fm = req.frontmatter("p1");
        let keys: Vec<&str> = fm.iter().map(|(k, _)| k).collect();
        assert_eq!(
            &keys[..8],
            &["title", "date", "author", "description", "categories", "tags", "postId", "draft"]
        );
        assert_eq!(keys.last(), Some(&"UseHugoToc"));
        assert!(!fm.contains("content"));
        assert!(fm.ensure_complete().is_ok());

        let rendered = fm.render();
        assert!(rendered.contains("postId: p1\n"));
        assert!(rendered.contains("description: \n"));
        assert!(rendered.contains("tags: [\"a\"]\n"));
        assert!(rendered.contains("showToc: true\n"));
    }

    #[test]
    fn delete_outcome_serialization() {
        let value = serde_json::to_value(DeleteOutcome::deleted("p1")).unwrap();
        assert_eq!(
            value,
            json!({ "deleted": true, "postId": "p1", "status": "success" })
        );

        let value = serde_json::to_value(DeleteOutcome::not_found("p1")).unwrap();
        assert_eq!(value["status"], "not_found");
        assert_eq!(value["message"], "Post not found");
    }

    #[test]
    fn upsert_outcome_omits_empty_warnings() {
        let outcome = UpsertOutcome {
            post_id: "p1".into(),
            status: "success".into(),
            warnings: vec![],
        };
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({ "postId": "p1", "status": "success" })
        );
    }
}
