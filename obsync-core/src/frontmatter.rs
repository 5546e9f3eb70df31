//! Hugo frontmatter rendering
//!
//! Produces the header block written at the top of every post:
//! ```markdown
//! ---
//! title: Example
//! draft: false
//! tags: ["a", "b"]
//! ---
//! ```
//! One `key: value` line per field, in insertion order. Values are written
//! as-is; there is no quoting and no parser for reading the block back.

use std::fmt;

use crate::error::{Result, SyncError};

const FRONTMATTER_DELIMITER: &str = "---";

/// Fields that never appear in the header even if present
pub const EXCLUDED_FIELDS: &[&str] = &["content", "attachments", "filename"];

/// Fields every stored post header must carry
pub const REQUIRED_FIELDS: &[&str] = &[
    "title",
    "description",
    "date",
    "tags",
    "categories",
    "author",
    "draft",
    "showToc",
    "TocOpen",
    "hidemeta",
    "comments",
    "disableHLJS",
    "disableShare",
    "hideSummary",
    "searchHidden",
    "ShowReadingTime",
    "ShowBreadCrumbs",
    "ShowPostNavLinks",
    "ShowWordCount",
    "ShowRssButtonInSectionTermList",
    "UseHugoToc",
];

/// A single header value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Rendered as an empty string
    Null,
    Bool(bool),
    Text(String),
    List(Vec<String>),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Text(s) => f.write_str(s),
            Self::List(items) => write!(f, "{:?}", items),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

/// Ordered field set for one post header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    fields: Vec<(String, FieldValue)>,
}

impl Frontmatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field. An existing key keeps its position and gets the new value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fail on the first entry of [`REQUIRED_FIELDS`] that is absent
    pub fn ensure_complete(&self) -> Result<()> {
        match REQUIRED_FIELDS.iter().find(|field| !self.contains(field)) {
            Some(field) => Err(SyncError::missing_field(*field)),
            None => Ok(()),
        }
    }

    /// Render the delimited header block, ending with a newline after the
    /// closing `---`.
    pub fn render(&self) -> String {
        let mut out = String::from(FRONTMATTER_DELIMITER);
        out.push('\n');
        for (key, value) in self.iter() {
            if EXCLUDED_FIELDS.contains(&key) {
                continue;
            }
            out.push_str(&format!("{}: {}\n", key, value));
        }
        out.push_str(FRONTMATTER_DELIMITER);
        out.push('\n');
        out
    }
}

/// Render header plus body as a complete document
pub fn write_with_frontmatter(frontmatter: &Frontmatter, body: &str) -> String {
    let mut document = frontmatter.render();
    document.push_str(body);
    document
}
