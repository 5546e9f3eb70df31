//! obsync-core: publish Obsidian notes as Hugo content
//!
//! Posts become `{content_root}/{category}/{postId}.md` with a frontmatter
//! header; their attachments are decoded into
//! `{static_root}/media/{ext}/{postId}/`. The HTTP layer lives in
//! `obsync-server`.

pub mod attachments;
pub mod config;
pub mod content;
pub mod error;
pub mod frontmatter;
pub mod locks;
pub mod models;
pub mod path_grammar;
pub mod posts;

pub use attachments::{rewrite_references, AttachmentOutcome, AttachmentStore, ValidatedAttachment};
pub use config::SyncConfig;
pub use content::{category_dir_name, ContentStore, UNCATEGORIZED};
pub use error::{Result, SyncError};
pub use frontmatter::{FieldValue, Frontmatter};
pub use models::{AttachmentInput, Categories, DeleteOutcome, DisplayFlags, PostRequest, UpsertOutcome};
pub use path_grammar::{AttachmentPath, PathGrammar, PathMatching, ATTACHMENT_PATH_PATTERN};
pub use posts::PostService;
