//! Account balance repository.
//!
//! Balances are a snapshot, not a history: each sync replaces the rows of
//! the accounts it covered so stale currencies disappear.

use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePool;

use crate::models::AccountBalance;

/// Repository for account balance snapshots.
#[derive(Debug, Clone)]
pub struct BalanceRepository {
    pool: SqlitePool,
}

impl BalanceRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Replaces the balance rows for the given accounts in one
    /// transaction: existing rows for those accounts are deleted, then the
    /// fresh rows inserted.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails.
    pub async fn replace_for_accounts(
        &self,
        account_ids: &[i64],
        rows: &[AccountBalance],
    ) -> Result<u64> {
        if account_ids.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin transaction")?;

        let placeholders = (1..=account_ids.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let delete = format!("DELETE FROM account_balances WHERE account_id IN ({placeholders})");
        let mut delete_query = sqlx::query(&delete);
        for id in account_ids {
            delete_query = delete_query.bind(id);
        }
        delete_query
            .execute(&mut *tx)
            .await
            .context("failed to clear stale balances")?;

        let mut written = 0u64;
        for row in rows {
            let result = sqlx::query(
                r"
                INSERT INTO account_balances
                    (id, account_id, account_name, exchange_name, market_code,
                     currency_code, currency_slug, percentage, position,
                     on_orders, btc_value, usd_value)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                ",
            )
            .bind(&row.id)
            .bind(row.account_id)
            .bind(&row.account_name)
            .bind(&row.exchange_name)
            .bind(&row.market_code)
            .bind(&row.currency_code)
            .bind(&row.currency_slug)
            .bind(row.percentage.to_string())
            .bind(row.position.to_string())
            .bind(row.on_orders.to_string())
            .bind(row.btc_value.to_string())
            .bind(row.usd_value.to_string())
            .execute(&mut *tx)
            .await
            .context("failed to insert balance row")?;

            written += result.rows_affected();
        }

        tx.commit().await.context("failed to commit transaction")?;
        Ok(written)
    }

    /// Loads all stored balance rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(&self) -> Result<Vec<AccountBalance>> {
        let rows = sqlx::query_as::<_, BalanceRow>(
            "SELECT * FROM account_balances ORDER BY account_id, currency_code",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(BalanceRow::into_model).collect()
    }
}

/// Raw row shape; decimal text parsed back on read.
#[derive(sqlx::FromRow)]
struct BalanceRow {
    id: String,
    account_id: i64,
    account_name: String,
    exchange_name: Option<String>,
    market_code: Option<String>,
    currency_code: String,
    currency_slug: String,
    percentage: String,
    position: String,
    on_orders: String,
    btc_value: String,
    usd_value: String,
}

impl BalanceRow {
    fn into_model(self) -> Result<AccountBalance> {
        Ok(AccountBalance {
            id: self.id,
            account_id: self.account_id,
            account_name: self.account_name,
            exchange_name: self.exchange_name,
            market_code: self.market_code,
            currency_code: self.currency_code,
            currency_slug: self.currency_slug,
            percentage: self.percentage.parse()?,
            position: self.position.parse()?,
            on_orders: self.on_orders.parse()?,
            btc_value: self.btc_value.parse()?,
            usd_value: self.usd_value.parse()?,
        })
    }
}
