use async_trait::async_trait;
use serde::Deserialize;
use sqlx::PgPool;

use super::PersistError;

/// Contact form submission, as posted to `/api/contact`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewContactMessage {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: String,
}

#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn insert(&self, message: &NewContactMessage) -> Result<(), PersistError>;
}

pub struct PgContactMessages {
    pool: PgPool,
}

impl PgContactMessages {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactStore for PgContactMessages {
    async fn insert(&self, message: &NewContactMessage) -> Result<(), PersistError> {
        sqlx::query("INSERT INTO contact_messages (name, email, subject, message) VALUES ($1, $2, $3, $4)")
            .bind(&message.name)
            .bind(&message.email)
            .bind(&message.subject)
            .bind(&message.message)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
