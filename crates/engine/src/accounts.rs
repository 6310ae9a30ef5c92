//! Account balance synchronization.
//!
//! For every reserved-funds account enabled in the profile, the remote is
//! first asked to refresh its balances from the exchange, then the
//! per-currency rows are fetched and the stored snapshot replaced.

use anyhow::Result;
use botsync_core::Profile;
use botsync_data::models::AccountBalance;
use botsync_data::BalanceRepository;
use botsync_threecommas::ThreeCommasClient;

/// Syncs balance rows for the profile's enabled accounts.
///
/// # Returns
///
/// The number of balance rows stored.
///
/// # Errors
///
/// Returns an error if any remote call or the store write fails; the
/// snapshot is replaced transactionally so a failure leaves the previous
/// rows intact.
pub async fn sync_account_balances(
    client: &ThreeCommasClient,
    profile: &Profile,
    balances: &BalanceRepository,
) -> Result<usize> {
    let enabled_ids = profile.enabled_account_ids();
    if enabled_ids.is_empty() {
        tracing::debug!(profile_id = %profile.id, "no enabled reserved-funds accounts");
        return Ok(0);
    }

    let accounts = client.get_accounts().await?;
    let mut rows = Vec::new();

    for account in accounts
        .into_iter()
        .filter(|a| enabled_ids.contains(&a.id))
    {
        // Refresh first so the table data reflects the exchange, not the
        // remote's cache.
        client.load_balances(account.id).await?;
        let table = client.account_table_data(account.id).await?;

        for row in table {
            rows.push(AccountBalance {
                id: AccountBalance::key(row.account_id, &row.currency_slug),
                account_id: row.account_id,
                account_name: account.name.clone(),
                exchange_name: account.exchange_name.clone(),
                market_code: account.market_code.clone(),
                currency_code: row.currency_code,
                currency_slug: row.currency_slug,
                percentage: row.percentage,
                position: row.position,
                on_orders: row.on_orders,
                btc_value: row.btc_value,
                usd_value: row.usd_value,
            });
        }
    }

    balances.replace_for_accounts(&enabled_ids, &rows).await?;
    tracing::info!(
        profile_id = %profile.id,
        accounts = enabled_ids.len(),
        rows = rows.len(),
        "account balances synced"
    );
    Ok(rows.len())
}
