//! Bot repository.
//!
//! Synced bots are overwritten wholesale on every cycle; rows whose origin
//! is `custom` are user-authored and the upsert refuses to touch them.

use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePool;

use crate::models::{BotOrigin, CanonicalBot};

/// Repository for canonical bot records.
#[derive(Debug, Clone)]
pub struct BotRepository {
    pool: SqlitePool,
}

impl BotRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Upserts a batch of bots in one transaction.
    ///
    /// Existing rows with `origin = custom` are left untouched; the upsert
    /// carries a conflict guard so a sync can never clobber a user-authored
    /// bot even if the remote reuses the id.
    ///
    /// # Returns
    ///
    /// The number of rows written (custom rows skipped by the guard do not
    /// count).
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the transaction fails.
    pub async fn upsert_batch(&self, bots: &[CanonicalBot]) -> Result<u64> {
        if bots.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin transaction")?;
        let mut written = 0u64;

        for bot in bots {
            let record_json = serde_json::to_string(bot)?;
            let result = sqlx::query(
                r"
                INSERT INTO bots
                    (id, origin, account_id, name, is_enabled, from_currency,
                     max_funds, updated_at, record_json)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                ON CONFLICT(id) DO UPDATE SET
                    origin = excluded.origin,
                    account_id = excluded.account_id,
                    name = excluded.name,
                    is_enabled = excluded.is_enabled,
                    from_currency = excluded.from_currency,
                    max_funds = excluded.max_funds,
                    updated_at = excluded.updated_at,
                    record_json = excluded.record_json
                WHERE bots.origin != 'custom'
                ",
            )
            .bind(bot.id)
            .bind(bot.origin.as_str())
            .bind(bot.account_id)
            .bind(&bot.name)
            .bind(bot.is_enabled)
            .bind(&bot.from_currency)
            .bind(bot.max_funds.to_string())
            .bind(bot.updated_at.to_rfc3339())
            .bind(record_json)
            .execute(&mut *tx)
            .await
            .context("failed to upsert bot")?;

            written += result.rows_affected();
        }

        tx.commit().await.context("failed to commit transaction")?;
        Ok(written)
    }

    /// Loads all bots, synced and custom.
    ///
    /// # Errors
    ///
    /// Returns an error if the query or deserialization fails.
    pub async fn list(&self) -> Result<Vec<CanonicalBot>> {
        let rows = sqlx::query_as::<_, (String,)>(
            "SELECT record_json FROM bots ORDER BY updated_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut bots = Vec::with_capacity(rows.len());
        for (json,) in rows {
            bots.push(serde_json::from_str(&json)?);
        }
        Ok(bots)
    }

    /// Loads one bot by remote id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query or deserialization fails.
    pub async fn get(&self, id: i64) -> Result<Option<CanonicalBot>> {
        let row = sqlx::query_as::<_, (String,)>("SELECT record_json FROM bots WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some((json,)) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Returns the stored origin for a bot id, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn origin_of(&self, id: i64) -> Result<Option<BotOrigin>> {
        let row = sqlx::query_as::<_, (String,)>("SELECT origin FROM bots WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(origin,)| {
            if origin == "custom" {
                BotOrigin::Custom
            } else {
                BotOrigin::Sync
            }
        }))
    }
}
