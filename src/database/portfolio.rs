use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, QueryBuilder, Row};
use uuid::Uuid;

use super::content::{ActionMessages, AssetRef, ContentDraft, ContentRecords, ListFilter};
use super::PersistError;

const COLUMNS: &str =
    "id, title, slug, description, image_url, live_url, github_url, technologies, is_published, created_at";

pub const MESSAGES: ActionMessages = ActionMessages {
    access_denied: "Access denied. You are not admin.",
    image_required: "Portfolio image is required.",
    upload_failed: "Image upload failed",
    create_failed: "Failed to create portfolio item",
    created: "Portfolio item created successfully!",
    id_missing: "Portfolio ID not found for update.",
    update_failed: "Failed to update portfolio item",
    updated: "Portfolio item updated successfully!",
    delete_failed: "Failed to delete portfolio item",
    deleted: "Portfolio item deleted successfully!",
};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PortfolioRecord {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub image_url: Option<String>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub technologies: Vec<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioDraft {
    pub title: String,
    pub slug: String,
    pub description: String,
    #[serde(default)]
    pub live_url: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub is_published: bool,
}

impl ContentDraft for PortfolioDraft {
    fn slug(&self) -> &str {
        &self.slug
    }
}

pub struct PgPortfolio {
    pool: PgPool,
}

impl PgPortfolio {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentRecords for PgPortfolio {
    type Draft = PortfolioDraft;
    type Record = PortfolioRecord;

    fn bucket(&self) -> &'static str {
        "portimages"
    }

    fn label(&self) -> &'static str {
        "Portfolio item"
    }

    fn messages(&self) -> &'static ActionMessages {
        &MESSAGES
    }

    fn revalidate_paths(&self, slug: Option<&str>) -> Vec<String> {
        let mut paths = vec!["/portfolio".to_string()];
        if let Some(slug) = slug {
            paths.push(format!("/portfolio/{}", slug));
        }
        paths
    }

    async fn list(&self, filter: &ListFilter) -> Result<Vec<PortfolioRecord>, PersistError> {
        let mut qb = QueryBuilder::new(format!("SELECT {} FROM portfolio", COLUMNS));
        let mut has_where = false;

        if filter.published_only {
            qb.push(" WHERE is_published = TRUE");
            has_where = true;
        }
        if let Some(q) = &filter.search {
            qb.push(if has_where { " AND" } else { " WHERE" });
            let pattern = format!("%{}%", q);
            qb.push(" (title ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR description ILIKE ");
            qb.push_bind(pattern);
            qb.push(" OR technologies @> ARRAY[");
            qb.push_bind(q.clone());
            qb.push("]::text[])");
        }
        qb.push(" ORDER BY created_at DESC");

        Ok(qb.build_query_as::<PortfolioRecord>().fetch_all(&self.pool).await?)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PortfolioRecord>, PersistError> {
        let sql = format!("SELECT {} FROM portfolio WHERE slug = $1", COLUMNS);
        Ok(sqlx::query_as::<_, PortfolioRecord>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn related(&self, exclude: Uuid, limit: i64) -> Result<Vec<PortfolioRecord>, PersistError> {
        let sql = format!(
            "SELECT {} FROM portfolio WHERE id <> $1 ORDER BY created_at DESC LIMIT $2",
            COLUMNS
        );
        Ok(sqlx::query_as::<_, PortfolioRecord>(&sql)
            .bind(exclude)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn count(&self) -> Result<i64, PersistError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM portfolio")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get::<i64, _>("count"))
    }

    async fn insert(&self, draft: &PortfolioDraft, image_url: &str) -> Result<(), PersistError> {
        sqlx::query(
            "INSERT INTO portfolio \
             (title, slug, description, image_url, live_url, github_url, technologies, is_published) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&draft.title)
        .bind(&draft.slug)
        .bind(&draft.description)
        .bind(image_url)
        .bind(&draft.live_url)
        .bind(&draft.github_url)
        .bind(&draft.technologies)
        .bind(draft.is_published)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, id: Uuid, draft: &PortfolioDraft, image_url: Option<&str>) -> Result<(), PersistError> {
        sqlx::query(
            "UPDATE portfolio SET \
             title = $1, slug = $2, description = $3, image_url = $4, live_url = $5, \
             github_url = $6, technologies = $7, is_published = $8 \
             WHERE id = $9",
        )
        .bind(&draft.title)
        .bind(&draft.slug)
        .bind(&draft.description)
        .bind(image_url)
        .bind(&draft.live_url)
        .bind(&draft.github_url)
        .bind(&draft.technologies)
        .bind(draft.is_published)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn asset_ref(&self, id: Uuid) -> Result<AssetRef, PersistError> {
        let row = sqlx::query("SELECT image_url, slug FROM portfolio WHERE id = $1")
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
        sqlx::query("DELETE FROM portfolio WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
