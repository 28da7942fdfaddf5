use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, QueryBuilder, Row};
use uuid::Uuid;

use super::content::{ActionMessages, AssetRef, ContentDraft, ContentRecords, ListFilter};
use super::PersistError;

const COLUMNS: &str = "id, name, slug, description, image_url, live_demo_url, download_url, gumroad_url, \
     lynkid_url, payhip_url, tags, price, is_free, is_published, type AS kind, created_at";

pub const MESSAGES: ActionMessages = ActionMessages {
    access_denied: "Access denied. You are not admin.",
    image_required: "Template image is required.",
    upload_failed: "Image upload failed",
    create_failed: "Failed to insert template",
    created: "Template successfully created!",
    id_missing: "Template ID not found for update.",
    update_failed: "Failed to update template",
    updated: "Template successfully updated!",
    delete_failed: "Failed to delete template",
    deleted: "Template successfully deleted!",
};

pub const PRICE_MESSAGE: &str = "Invalid price. Price must be a number between $0.00 and $1,000,000.00 \
     with up to two decimal places.";

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TemplateRecord {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub image_url: Option<String>,
    pub live_demo_url: Option<String>,
    pub download_url: Option<String>,
    pub gumroad_url: Option<String>,
    pub lynkid_url: Option<String>,
    pub payhip_url: Option<String>,
    pub tags: Vec<String>,
    pub price: Decimal,
    pub is_free: bool,
    pub is_published: bool,
    #[serde(rename = "type")]
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateDraft {
    pub name: String,
    pub slug: String,
    pub description: String,
    #[serde(default)]
    pub live_demo_url: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub gumroad_url: Option<String>,
    #[serde(default)]
    pub lynkid_url: Option<String>,
    #[serde(default)]
    pub payhip_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub price: Decimal,
    #[serde(default)]
    pub is_free: bool,
    #[serde(default)]
    pub is_published: bool,
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl ContentDraft for TemplateDraft {
    fn slug(&self) -> &str {
        &self.slug
    }

    /// Price bounds plus an exact two-decimal-places check, done on Decimal
    /// (scale by rounding, compare by value) so no float representation
    /// error can leak in.
    fn validate(&self) -> Result<(), String> {
        let price = self.price;
        if price.is_sign_negative() || price > Decimal::from(1_000_000u32) || price.round_dp(2) != price {
            return Err(PRICE_MESSAGE.to_string());
        }
        Ok(())
    }
}

pub struct PgTemplates {
    pool: PgPool,
}

impl PgTemplates {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentRecords for PgTemplates {
    type Draft = TemplateDraft;
    type Record = TemplateRecord;

    fn bucket(&self) -> &'static str {
        "images"
    }

    fn label(&self) -> &'static str {
        "Template"
    }

    fn messages(&self) -> &'static ActionMessages {
        &MESSAGES
    }

    fn revalidate_paths(&self, slug: Option<&str>) -> Vec<String> {
        let mut paths = vec!["/templates".to_string()];
        if let Some(slug) = slug {
            paths.push(format!("/templates/{}", slug));
        }
        paths
    }

    async fn list(&self, filter: &ListFilter) -> Result<Vec<TemplateRecord>, PersistError> {
        let mut qb = QueryBuilder::new(format!("SELECT {} FROM templates", COLUMNS));
        let mut has_where = false;

        if filter.published_only {
            qb.push(" WHERE is_published = TRUE");
            has_where = true;
        }
        if let Some(q) = &filter.search {
            qb.push(if has_where { " AND" } else { " WHERE" });
            let pattern = format!("%{}%", q);
            qb.push(" (name ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR description ILIKE ");
            qb.push_bind(pattern);
            qb.push(" OR tags @> ARRAY[");
            qb.push_bind(q.clone());
            qb.push("]::text[])");
        }
        qb.push(" ORDER BY created_at DESC");

        Ok(qb.build_query_as::<TemplateRecord>().fetch_all(&self.pool).await?)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<TemplateRecord>, PersistError> {
        let sql = format!("SELECT {} FROM templates WHERE slug = $1", COLUMNS);
        Ok(sqlx::query_as::<_, TemplateRecord>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn count(&self) -> Result<i64, PersistError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM templates")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get::<i64, _>("count"))
    }

    async fn insert(&self, draft: &TemplateDraft, image_url: &str) -> Result<(), PersistError> {
        sqlx::query(
            "INSERT INTO templates \
             (name, slug, description, image_url, live_demo_url, download_url, gumroad_url, \
              lynkid_url, payhip_url, tags, price, is_free, is_published, type) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(&draft.name)
        .bind(&draft.slug)
        .bind(&draft.description)
        .bind(image_url)
        .bind(&draft.live_demo_url)
        .bind(&draft.download_url)
        .bind(&draft.gumroad_url)
        .bind(&draft.lynkid_url)
        .bind(&draft.payhip_url)
        .bind(&draft.tags)
        .bind(draft.price)
        .bind(draft.is_free)
        .bind(draft.is_published)
        .bind(&draft.kind)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, id: Uuid, draft: &TemplateDraft, image_url: Option<&str>) -> Result<(), PersistError> {
        sqlx::query(
            "UPDATE templates SET \
             name = $1, slug = $2, description = $3, image_url = $4, live_demo_url = $5, \
             download_url = $6, gumroad_url = $7, lynkid_url = $8, payhip_url = $9, tags = $10, \
             price = $11, is_free = $12, is_published = $13, type = $14 \
             WHERE id = $15",
        )
        .bind(&draft.name)
        .bind(&draft.slug)
        .bind(&draft.description)
        .bind(image_url)
        .bind(&draft.live_demo_url)
        .bind(&draft.download_url)
        .bind(&draft.gumroad_url)
        .bind(&draft.lynkid_url)
        .bind(&draft.payhip_url)
        .bind(&draft.tags)
        .bind(draft.price)
        .bind(draft.is_free)
        .bind(draft.is_published)
        .bind(&draft.kind)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn asset_ref(&self, id: Uuid) -> Result<AssetRef, PersistError> {
        let row = sqlx::query("SELECT image_url, slug FROM templates WHERE id = $1")
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
        sqlx::query("DELETE FROM templates WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
