use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use super::PersistError;

/// Filters for the list read paths.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    /// Free-text search: matched case-insensitively against the title/name
    /// and description, or as an exact element of the tag array.
    pub search: Option<String>,
    /// Restrict to rows whose tag array contains all of these.
    pub tags: Vec<String>,
    /// Restrict to published rows.
    pub published_only: bool,
}

impl ListFilter {
    pub fn published() -> Self {
        Self {
            published_only: true,
            ..Self::default()
        }
    }
}

/// What a delete (or an update preserving its asset) needs to know about a
/// row before touching it.
#[derive(Debug, Clone, Default)]
pub struct AssetRef {
    pub image_url: Option<String>,
    pub slug: Option<String>,
}

/// User-facing result strings for one content type. The wording differs
/// slightly between types and each variant is kept verbatim; failure entries
/// are prefixes that get the underlying error appended.
pub struct ActionMessages {
    pub access_denied: &'static str,
    pub image_required: &'static str,
    pub upload_failed: &'static str,
    pub create_failed: &'static str,
    pub created: &'static str,
    pub id_missing: &'static str,
    pub update_failed: &'static str,
    pub updated: &'static str,
    pub delete_failed: &'static str,
    pub deleted: &'static str,
}

/// Incoming field data for a create/update, validated before anything is
/// uploaded or persisted.
pub trait ContentDraft: Send + Sync {
    fn slug(&self) -> &str;

    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Per-content-type persistence strategy. One implementation per table
/// (portfolio, templates, blog_posts); the generic mutating actions are
/// parameterized over this trait, and tests substitute in-memory fakes.
#[async_trait]
pub trait ContentRecords: Send + Sync {
    type Draft: ContentDraft;
    type Record: Serialize + Send + Sync;

    /// Storage bucket paired with this table.
    fn bucket(&self) -> &'static str;

    /// Human-readable name used in logs ("Portfolio item", ...).
    fn label(&self) -> &'static str;

    /// Result strings surfaced to the dashboard for this content type.
    fn messages(&self) -> &'static ActionMessages;

    /// Paths whose cached views a mutation invalidates.
    fn revalidate_paths(&self, slug: Option<&str>) -> Vec<String>;

    async fn list(&self, filter: &ListFilter) -> Result<Vec<Self::Record>, PersistError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Self::Record>, PersistError>;

    /// Sibling rows shown alongside a detail view. Only portfolio items use
    /// this; the default is empty.
    async fn related(&self, _exclude: Uuid, _limit: i64) -> Result<Vec<Self::Record>, PersistError> {
        Ok(Vec::new())
    }

    async fn count(&self) -> Result<i64, PersistError>;

    async fn insert(&self, draft: &Self::Draft, image_url: &str) -> Result<(), PersistError>;

    /// Full-row update; `image_url` is written as given (including null).
    async fn update(&self, id: Uuid, draft: &Self::Draft, image_url: Option<&str>) -> Result<(), PersistError>;

    /// Pre-mutation read of the row's asset URL and slug.
    async fn asset_ref(&self, id: Uuid) -> Result<AssetRef, PersistError>;

    async fn delete(&self, id: Uuid) -> Result<(), PersistError>;
}
