use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::PersistError;

/// Lookup of the per-user admin flag. Profiles are created out-of-band and
/// are read-only from this system's perspective.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// `Ok(None)` means the user has no profile row at all.
    async fn is_admin(&self, user_id: Uuid) -> Result<Option<bool>, PersistError>;
}

pub struct PgProfiles {
    pool: PgPool,
}

impl PgProfiles {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfiles {
    async fn is_admin(&self, user_id: Uuid) -> Result<Option<bool>, PersistError> {
        let row = sqlx::query("SELECT is_admin FROM profiles WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get::<bool, _>("is_admin")))
    }
}
