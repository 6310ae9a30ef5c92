//! SQLite database for the canonical record store.
//!
//! Owns the connection pool and bootstraps the write-path tables. Records
//! are stored with their query-relevant columns extracted and the full
//! canonical record as JSON, so adding derived fields does not require a
//! migration. Timestamps are stored as RFC 3339 text, monetary values as
//! decimal text.

use anyhow::Result;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

/// SQLite-backed store shared by the sync engine and the CLI.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Creates a connection pool and bootstraps the schema.
    ///
    /// # Arguments
    ///
    /// * `database_url` - SQLite URL, e.g. `sqlite://botsync.db?mode=rwc`
    ///
    /// # Errors
    ///
    /// Returns error if the connection or schema bootstrap fails.
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        let db = Self { pool };
        db.bootstrap().await?;
        Ok(db)
    }

    /// Creates an in-memory database, used by tests and dry runs.
    ///
    /// A single pooled connection: every `sqlite::memory:` connection is
    /// its own database, so a larger pool would scatter the tables.
    ///
    /// # Errors
    ///
    /// Returns error if the connection fails.
    pub async fn new_in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let db = Self { pool };
        db.bootstrap().await?;
        Ok(db)
    }

    /// Returns the underlying pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn bootstrap(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS deals (
                id INTEGER PRIMARY KEY,
                bot_id INTEGER NOT NULL,
                account_id INTEGER NOT NULL,
                currency TEXT NOT NULL,
                pair TEXT NOT NULL,
                closed_at TEXT,
                closed_at_millis INTEGER,
                finished INTEGER NOT NULL,
                updated_at TEXT NOT NULL,
                final_profit TEXT NOT NULL,
                deal_hours TEXT NOT NULL,
                profit_percent TEXT,
                max_deal_funds TEXT,
                bought_volume TEXT NOT NULL,
                record_json TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS bots (
                id INTEGER PRIMARY KEY,
                origin TEXT NOT NULL,
                account_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                is_enabled INTEGER NOT NULL,
                from_currency TEXT NOT NULL,
                max_funds TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                record_json TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS account_balances (
                id TEXT PRIMARY KEY,
                account_id INTEGER NOT NULL,
                account_name TEXT NOT NULL,
                exchange_name TEXT,
                market_code TEXT,
                currency_code TEXT NOT NULL,
                currency_slug TEXT NOT NULL,
                percentage TEXT NOT NULL,
                position TEXT NOT NULL,
                on_orders TEXT NOT NULL,
                btc_value TEXT NOT NULL,
                usd_value TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS sync_status (
                profile_id TEXT PRIMARY KEY,
                last_sync_time INTEGER,
                active_deal_ids TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bootstrap_creates_tables() {
        let db = Database::new_in_memory().await.expect("db");

        for table in ["deals", "bots", "account_balances", "sync_status"] {
            let count: (i64,) = sqlx::query_as(
                "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            )
            .bind(table)
            .fetch_one(db.pool())
            .await
            .expect("query");
            assert_eq!(count.0, 1, "missing table {table}");
        }
    }

    #[tokio::test]
    async fn bootstrap_is_idempotent() {
        let db = Database::new_in_memory().await.expect("db");
        db.bootstrap().await.expect("second bootstrap");
    }
}
