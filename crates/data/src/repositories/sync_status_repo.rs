//! Per-profile sync watermark persistence.

use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePool;

use crate::models::SyncWatermark;

/// Repository for the per-profile sync watermark.
#[derive(Debug, Clone)]
pub struct SyncStatusRepository {
    pool: SqlitePool,
}

impl SyncStatusRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Loads the watermark for a profile, or an empty one if the profile
    /// has never synced.
    ///
    /// # Errors
    ///
    /// Returns an error if the query or deserialization fails.
    pub async fn get(&self, profile_id: &str) -> Result<SyncWatermark> {
        let row = sqlx::query_as::<_, (Option<i64>, String)>(
            "SELECT last_sync_time, active_deal_ids FROM sync_status WHERE profile_id = ?1",
        )
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((last_sync_time, ids_json)) => Ok(SyncWatermark {
                profile_id: profile_id.to_string(),
                last_sync_time,
                active_deal_ids: serde_json::from_str(&ids_json)
                    .context("corrupt active_deal_ids")?,
            }),
            None => Ok(SyncWatermark::empty(profile_id)),
        }
    }

    /// Stores a watermark, overwriting the previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the upsert fails.
    pub async fn put(&self, watermark: &SyncWatermark) -> Result<()> {
        let ids_json = serde_json::to_string(&watermark.active_deal_ids)?;
        sqlx::query(
            r"
            INSERT INTO sync_status (profile_id, last_sync_time, active_deal_ids, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(profile_id) DO UPDATE SET
                last_sync_time = excluded.last_sync_time,
                active_deal_ids = excluded.active_deal_ids,
                updated_at = excluded.updated_at
            ",
        )
        .bind(&watermark.profile_id)
        .bind(watermark.last_sync_time)
        .bind(ids_json)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .context("failed to store watermark")?;

        Ok(())
    }
}
