//! Deal repository.
//!
//! Idempotent batch upserts keyed by the remote deal id. A whole batch is
//! applied in one transaction so readers never observe a half-applied
//! sync cycle.

use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePool;
use sqlx::Row;

use crate::models::CanonicalDeal;

/// Repository for canonical deal records.
#[derive(Debug, Clone)]
pub struct DealRepository {
    pool: SqlitePool,
}

impl DealRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Upserts a batch of deals in one transaction.
    ///
    /// # Returns
    ///
    /// The number of rows written.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the transaction fails.
    pub async fn upsert_batch(&self, deals: &[CanonicalDeal]) -> Result<u64> {
        if deals.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin transaction")?;
        let mut written = 0u64;

        for deal in deals {
            let record_json = serde_json::to_string(deal)?;
            let result = sqlx::query(
                r"
                INSERT INTO deals
                    (id, bot_id, account_id, currency, pair, closed_at,
                     closed_at_millis, finished, updated_at, final_profit,
                     deal_hours, profit_percent, max_deal_funds,
                     bought_volume, record_json)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
                ON CONFLICT(id) DO UPDATE SET
                    bot_id = excluded.bot_id,
                    account_id = excluded.account_id,
                    currency = excluded.currency,
                    pair = excluded.pair,
                    closed_at = excluded.closed_at,
                    closed_at_millis = excluded.closed_at_millis,
                    finished = excluded.finished,
                    updated_at = excluded.updated_at,
                    final_profit = excluded.final_profit,
                    deal_hours = excluded.deal_hours,
                    profit_percent = excluded.profit_percent,
                    max_deal_funds = excluded.max_deal_funds,
                    bought_volume = excluded.bought_volume,
                    record_json = excluded.record_json
                ",
            )
            .bind(deal.id)
            .bind(deal.bot_id)
            .bind(deal.account_id)
            .bind(&deal.currency)
            .bind(&deal.pair)
            .bind(deal.closed_at.map(|t| t.to_rfc3339()))
            .bind(deal.closed_at_millis)
            .bind(deal.finished)
            .bind(deal.updated_at.to_rfc3339())
            .bind(deal.final_profit.to_string())
            .bind(deal.deal_hours.to_string())
            .bind(deal.profit_percent.map(|p| p.to_string()))
            .bind(deal.max_deal_funds.map(|f| f.to_string()))
            .bind(deal.bought_volume.to_string())
            .bind(record_json)
            .execute(&mut *tx)
            .await
            .context("failed to upsert deal")?;

            written += result.rows_affected();
        }

        tx.commit().await.context("failed to commit transaction")?;
        Ok(written)
    }

    /// Loads one deal by remote id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query or deserialization fails.
    pub async fn get(&self, id: i64) -> Result<Option<CanonicalDeal>> {
        let row = sqlx::query("SELECT record_json FROM deals WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let json: String = row.try_get("record_json")?;
                Ok(Some(serde_json::from_str(&json)?))
            }
            None => Ok(None),
        }
    }

    /// Counts stored deals.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn count(&self) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT count(*) FROM deals")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    /// Loads the deals currently open, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query or deserialization fails.
    pub async fn list_active(&self) -> Result<Vec<CanonicalDeal>> {
        let rows = sqlx::query_as::<_, (String,)>(
            "SELECT record_json FROM deals WHERE closed_at IS NULL ORDER BY updated_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut deals = Vec::with_capacity(rows.len());
        for (json,) in rows {
            deals.push(serde_json::from_str(&json)?);
        }
        Ok(deals)
    }
}
