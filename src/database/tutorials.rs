use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, QueryBuilder, Row};
use uuid::Uuid;

use super::content::{ActionMessages, AssetRef, ContentDraft, ContentRecords, ListFilter};
use super::PersistError;

const COLUMNS: &str =
    "id, title, slug, content, excerpt, image_url, author, tags, is_published, created_at, updated_at";

// Note the wording drift against the other two types ("an admin", bare
// "Image is required."); each string is verbatim what the dashboard shows.
pub const MESSAGES: ActionMessages = ActionMessages {
    access_denied: "Access denied. You are not an admin.",
    image_required: "Image is required.",
    upload_failed: "Failed to upload image",
    create_failed: "Failed to create post",
    created: "Post successfully created!",
    id_missing: "Post ID not found for update.",
    update_failed: "Failed to update post",
    updated: "Post successfully updated!",
    delete_failed: "Failed to delete post",
    deleted: "Post successfully deleted!",
};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BlogPostRecord {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub image_url: Option<String>,
    pub author: String,
    pub tags: Vec<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPostDraft {
    pub title: String,
    pub slug: String,
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_published: bool,
}

impl ContentDraft for BlogPostDraft {
    fn slug(&self) -> &str {
        &self.slug
    }
}

pub struct PgTutorials {
    pool: PgPool,
}

impl PgTutorials {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentRecords for PgTutorials {
    type Draft = BlogPostDraft;
    type Record = BlogPostRecord;

    fn bucket(&self) -> &'static str {
        "blogimages"
    }

    fn label(&self) -> &'static str {
        "Post"
    }

    fn messages(&self) -> &'static ActionMessages {
        &MESSAGES
    }

    fn revalidate_paths(&self, slug: Option<&str>) -> Vec<String> {
        let mut paths = vec!["/tutorials".to_string()];
        if let Some(slug) = slug {
            paths.push(format!("/tutorials/{}", slug));
        }
        paths
    }

    async fn list(&self, filter: &ListFilter) -> Result<Vec<BlogPostRecord>, PersistError> {
        let mut qb = QueryBuilder::new(format!("SELECT {} FROM blog_posts", COLUMNS));
        let mut has_where = false;

        if filter.published_only {
            qb.push(" WHERE is_published = TRUE");
            has_where = true;
        }
        if let Some(q) = &filter.search {
            qb.push(if has_where { " AND" } else { " WHERE" });
            has_where = true;
            qb.push(" title ILIKE ");
            qb.push_bind(format!("%{}%", q));
        }
        if !filter.tags.is_empty() {
            qb.push(if has_where { " AND" } else { " WHERE" });
            qb.push(" tags @> ");
            qb.push_bind(filter.tags.clone());
            qb.push("::text[]");
        }
        qb.push(" ORDER BY created_at DESC");

        Ok(qb.build_query_as::<BlogPostRecord>().fetch_all(&self.pool).await?)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<BlogPostRecord>, PersistError> {
        // Public tutorial detail only shows published posts
        let sql = format!("SELECT {} FROM blog_posts WHERE slug = $1 AND is_published = TRUE", COLUMNS);
        Ok(sqlx::query_as::<_, BlogPostRecord>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn count(&self) -> Result<i64, PersistError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM blog_posts")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get::<i64, _>("count"))
    }

    async fn insert(&self, draft: &BlogPostDraft, image_url: &str) -> Result<(), PersistError> {
        sqlx::query(
            "INSERT INTO blog_posts \
             (title, slug, content, excerpt, image_url, author, tags, is_published) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&draft.title)
        .bind(&draft.slug)
        .bind(&draft.content)
        .bind(&draft.excerpt)
        .bind(image_url)
        .bind(&draft.author)
        .bind(&draft.tags)
        .bind(draft.is_published)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, id: Uuid, draft: &BlogPostDraft, image_url: Option<&str>) -> Result<(), PersistError> {
        sqlx::query(
            "UPDATE blog_posts SET \
             title = $1, slug = $2, content = $3, excerpt = $4, image_url = $5, author = $6, \
             tags = $7, is_published = $8, updated_at = NOW() \
             WHERE id = $9",
        )
        .bind(&draft.title)
        .bind(&draft.slug)
        .bind(&draft.content)
        .bind(&draft.excerpt)
        .bind(image_url)
        .bind(&draft.author)
        .bind(&draft.tags)
        .bind(draft.is_published)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn asset_ref(&self, id: Uuid) -> Result<AssetRef, PersistError> {
        let row = sqlx::query("SELECT image_url, slug FROM blog_posts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(PersistError::NotFound)?;
        Ok(AssetRef {
            image_url: row.get("image_url"),
            slug: Some(row.get::<String, _>("slug")),
        })
    }

    async fn delete(&self, id: Uuid) -> Result<(), PersistError> {
        sqlx::query("DELETE FROM blog_posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
