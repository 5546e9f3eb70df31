//! Post documents on disk
//!
//! Layout: `{content_root}/{category}/{postId}.md`. A post's category is
//! whatever directory its file currently sits in; nothing is read back from
//! the frontmatter.

use std::path::{Component, Path, PathBuf};

use tokio::fs;

use crate::error::{Result, SyncError};
use crate::frontmatter::{write_with_frontmatter, Frontmatter};
use crate::models::Categories;

/// Directory used when a post has no category
pub const UNCATEGORIZED: &str = "uncategorized";

/// Directory name for a post's categories.
///
/// First list element or the whole string, lowercased, spaces to
/// underscores. Path separators are replaced as well so the name stays a
/// single directory under the content root.
pub fn category_dir_name(categories: Option<&Categories>) -> String {
    let raw = match categories {
        Some(Categories::Many(items)) => items.first().map(String::as_str),
        Some(Categories::One(s)) => Some(s.as_str()),
        None => None,
    };

    match raw {
        Some(name) if !name.trim().is_empty() => {
            let dir = name.to_lowercase().replace([' ', '/', '\\'], "_");
            if dir == "." || dir == ".." {
                UNCATEGORIZED.to_string()
            } else {
                dir
            }
        }
        _ => UNCATEGORIZED.to_string(),
    }
}

fn post_filename(post_id: &str) -> String {
    format!("{}.md", post_id)
}

/// Reads and writes post documents under the content root
#[derive(Debug, Clone)]
pub struct ContentStore {
    content_root: PathBuf,
}

impl ContentStore {
    pub fn new(content_root: impl Into<PathBuf>) -> Self {
        Self {
            content_root: content_root.into(),
        }
    }

    pub fn content_root(&self) -> &Path {
        &self.content_root
    }

    /// `{content_root}/{category}/{postId}.md`
    pub fn post_path(&self, category_dir: &str, post_id: &str) -> PathBuf {
        self.content_root
            .join(category_dir)
            .join(post_filename(post_id))
    }

    /// Locate `{postId}.md` in any category directory.
    ///
    /// Directories are visited in sorted order so a duplicated id always
    /// resolves to the same file.
    pub async fn find(&self, post_id: &str) -> Result<Option<PathBuf>> {
        if !fs::try_exists(&self.content_root).await.unwrap_or(false) {
            return Ok(None);
        }

        let mut entries = fs::read_dir(&self.content_root).await?;
        let mut category_dirs = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if fs::metadata(&path).await.map(|m| m.is_dir()).unwrap_or(false) {
                category_dirs.push(path);
            }
        }
        category_dirs.sort();

        let filename = post_filename(post_id);
        let mut matches = Vec::new();
        for dir in category_dirs {
            let candidate = dir.join(&filename);
            if fs::metadata(&candidate)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false)
            {
                matches.push(candidate);
            }
        }

        if matches.len() > 1 {
            tracing::warn!(
                post_id = %post_id,
                count = matches.len(),
                chosen = %matches[0].display(),
                "post id found in more than one category"
            );
        }

        Ok(matches.into_iter().next())
    }

    pub async fn exists(&self, post_id: &str) -> Result<bool> {
        Ok(self.find(post_id).await?.is_some())
    }

    /// First path segment of `path` relative to the content root
    pub fn category_of(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.content_root).ok()?;
        match relative.components().next()? {
            Component::Normal(segment) => segment.to_str().map(str::to_string),
            _ => None,
        }
    }

    /// True if the stored file exists and its directory differs from the
    /// directory the requested categories resolve to
    pub async fn needs_move(&self, current_path: &Path, categories: Option<&Categories>) -> bool {
        if !fs::try_exists(current_path).await.unwrap_or(false) {
            return false;
        }
        self.category_of(current_path).as_deref() != Some(category_dir_name(categories).as_str())
    }

    /// Copy the document into its new category directory, then remove the
    /// old file. The old file is kept if the new one cannot be confirmed.
    pub async fn move_to_category(
        &self,
        post_id: &str,
        current_path: &Path,
        categories: Option<&Categories>,
    ) -> Result<PathBuf> {
        let new_path = self.post_path(&category_dir_name(categories), post_id);
        tracing::info!(
            post_id = %post_id,
            from = %current_path.display(),
            to = %new_path.display(),
            "moving post to new category"
        );

        let moved = async {
            if let Some(parent) = new_path.parent() {
                fs::create_dir_all(parent).await?;
            }
            let document = fs::read_to_string(current_path).await?;
            fs::write(&new_path, document).await?;

            if !fs::try_exists(&new_path).await? {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("new file missing at {}", new_path.display()),
                ));
            }
            fs::remove_file(current_path).await
        }
        .await;

        match moved {
            Ok(()) => Ok(new_path),
            Err(e) => {
                tracing::error!(post_id = %post_id, error = %e, "failed to move post");
                Err(SyncError::file_operation(
                    post_id,
                    format!("failed to move post: {}", e),
                ))
            }
        }
    }

    /// Write header plus body to `{category}/{postId}.md`, replacing any
    /// file already at that path
    pub async fn save(
        &self,
        post_id: &str,
        frontmatter: &Frontmatter,
        body: &str,
        categories: Option<&Categories>,
    ) -> Result<PathBuf> {
        frontmatter.ensure_complete()?;

        let path = self.post_path(&category_dir_name(categories), post_id);
        let document = write_with_frontmatter(frontmatter, body);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| SyncError::file_operation(post_id, e))?;
        }
        fs::write(&path, document)
            .await
            .map_err(|e| SyncError::file_operation(post_id, e))?;

        tracing::info!(post_id = %post_id, path = %path.display(), "wrote post");
        Ok(path)
    }

    /// Remove the post's document. `Ok(false)` when no document exists.
    pub async fn delete(&self, post_id: &str) -> Result<bool> {
        let Some(path) = self.find(post_id).await? else {
            return Ok(false);
        };

        fs::remove_file(&path)
            .await
            .map_err(|e| SyncError::file_operation(post_id, e))?;

        tracing::info!(post_id = %post_id, path = %path.display(), "deleted post");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontmatter::{FieldValue, REQUIRED_FIELDS};
    use tempfile::TempDir;

    fn one(s: &str) -> Categories {
        Categories::One(s.to_string())
    }

    fn complete_frontmatter(title: &str) -> Frontmatter {
        let mut fm = Frontmatter::new();
        for field in REQUIRED_FIELDS {
            fm.set(*field, FieldValue::Null);
        }
        fm.set("title", title);
        fm
    }

    #[test]
    fn test_category_dir_name() {
        assert_eq!(category_dir_name(Some(&one("My Blog"))), "my_blog");
        assert_eq!(
            category_dir_name(Some(&Categories::Many(vec!["Tech".into(), "Other".into()]))),
            "tech"
        );
        assert_eq!(category_dir_name(Some(&one(""))), UNCATEGORIZED);
        assert_eq!(category_dir_name(Some(&one("   "))), UNCATEGORIZED);
        assert_eq!(category_dir_name(Some(&Categories::Many(vec![]))), UNCATEGORIZED);
        assert_eq!(category_dir_name(None), UNCATEGORIZED);
    }

    #[test]
    fn test_category_dir_name_is_idempotent() {
        let once = category_dir_name(Some(&one("Deep Dive Notes")));
        assert_eq!(once, "deep_dive_notes");
        assert_eq!(category_dir_name(Some(&one(&once))), once);
    }

    #[test]
    fn test_category_dir_name_stays_one_segment() {
        assert_eq!(category_dir_name(Some(&one("a/b"))), "a_b");
        assert_eq!(category_dir_name(Some(&one(".."))), UNCATEGORIZED);
    }

    #[test]
    fn test_category_of() {
        let store = ContentStore::new("/site/content");
        assert_eq!(
            store.category_of(Path::new("/site/content/blog/p1.md")),
            Some("blog".to_string())
        );
        assert_eq!(store.category_of(Path::new("/elsewhere/blog/p1.md")), None);
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let temp = TempDir::new().unwrap();
        let store = ContentStore::new(temp.path());

        let path = store
            .save("p1", &complete_frontmatter("Hello"), "Body", Some(&one("Blog")))
            .await
            .unwrap();

        assert_eq!(path, temp.path().join("blog").join("p1.md"));
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("---\n"));
        assert!(text.contains("title: Hello\n"));
        assert!(text.ends_with("---\nBody"));

        assert_eq!(store.find("p1").await.unwrap(), Some(path));
        assert_eq!(store.find("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_rejects_incomplete_frontmatter() {
        let temp = TempDir::new().unwrap();
        let store = ContentStore::new(temp.path());

        let mut fm = Frontmatter::new();
        fm.set("title", "T");
        let err = store.save("p1", &fm, "Body", None).await.unwrap_err();
        assert!(matches!(err, SyncError::MissingRequiredField { .. }));
        assert!(!temp.path().join(UNCATEGORIZED).join("p1.md").exists());
    }

    #[tokio::test]
    async fn test_find_with_missing_root() {
        let temp = TempDir::new().unwrap();
        let store = ContentStore::new(temp.path().join("nope"));
        assert_eq!(store.find("p1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_find_duplicate_is_deterministic() {
        let temp = TempDir::new().unwrap();
        let store = ContentStore::new(temp.path());
        for dir in ["zeta", "alpha"] {
            std::fs::create_dir_all(temp.path().join(dir)).unwrap();
            std::fs::write(temp.path().join(dir).join("dup.md"), dir).unwrap();
        }

        let found = store.find("dup").await.unwrap().unwrap();
        assert_eq!(found, temp.path().join("alpha").join("dup.md"));
    }

    #[tokio::test]
    async fn test_needs_move() {
        let temp = TempDir::new().unwrap();
        let store = ContentStore::new(temp.path());
        let path = store
            .save("p1", &complete_frontmatter("T"), "Body", Some(&one("Blog")))
            .await
            .unwrap();

        assert!(!store.needs_move(&path, Some(&one("blog"))).await);
        assert!(store.needs_move(&path, Some(&one("Tech"))).await);
        assert!(store.needs_move(&path, None).await);
        assert!(
            !store
                .needs_move(&temp.path().join("blog/none.md"), Some(&one("Tech")))
                .await
        );
    }

    #[tokio::test]
    async fn test_move_preserves_content() {
        let temp = TempDir::new().unwrap();
        let store = ContentStore::new(temp.path());
        let old = store
            .save("p1", &complete_frontmatter("T"), "Body", Some(&one("Blog")))
            .await
            .unwrap();
        let before = std::fs::read_to_string(&old).unwrap();

        let new = store
            .move_to_category("p1", &old, Some(&one("Tech Notes")))
            .await
            .unwrap();

        assert_eq!(new, temp.path().join("tech_notes").join("p1.md"));
        assert!(!old.exists());
        assert_eq!(std::fs::read_to_string(&new).unwrap(), before);
    }

    #[tokio::test]
    async fn test_move_missing_source_fails_without_side_effects() {
        let temp = TempDir::new().unwrap();
        let store = ContentStore::new(temp.path());
        let missing = temp.path().join("blog").join("p1.md");

        let err = store
            .move_to_category("p1", &missing, Some(&one("Tech")))
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::FileOperation { ref post_id, .. } if post_id == "p1"));
        assert!(!temp.path().join("tech").join("p1.md").exists());
    }

    #[tokio::test]
    async fn test_delete() {
        let temp = TempDir::new().unwrap();
        let store = ContentStore::new(temp.path());
        let path = store
            .save("p1", &complete_frontmatter("T"), "Body", None)
            .await
            .unwrap();
        assert_eq!(path, temp.path().join(UNCATEGORIZED).join("p1.md"));

        assert!(store.delete("p1").await.unwrap());
        assert!(!path.exists());
        assert!(!store.delete("p1").await.unwrap());
    }
}
