//! Sync orchestration.
//!
//! One orchestrator serves all profiles. Each profile's cycles are
//! mutually exclusive (concurrent triggers queue on a per-profile lock,
//! never interleave) because the watermark read-modify-write spans several
//! remote calls. Within a cycle the flow is:
//!
//! 1. fetch the active-scope snapshot;
//! 2. autoSync only: short-circuit if the open-deal id set matches the
//!    prior watermark;
//! 3. otherwise paginate `{active, completed, finished}` by update time
//!    descending until the watermark stop condition, capturing the new
//!    watermark from the first record of the first page;
//! 4. reconcile manual safety orders with bounded concurrency;
//! 5. normalize and upsert the merged deal set;
//! 6. advance the watermark, as the final step and only on change.
//!
//! A failure anywhere before step 6 leaves the stored watermark untouched;
//! the next scheduled cycle re-fetches the overlap, and idempotent upserts
//! make the overlap harmless. Cancellation (dropping the future) has the
//! same property since the watermark write is the last await.

use anyhow::{Context, Result};
use botsync_core::{validate_profile_filters, Profile};
use botsync_data::models::{CanonicalDeal, SyncWatermark};
use botsync_data::Repositories;
use botsync_threecommas::types::{DealQuery, RawDeal};
use botsync_threecommas::{Paginator, ThreeCommasClient};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, Semaphore};
use tokio::task::JoinSet;

use crate::accounts;
use crate::market_orders::{self, ManualOrders};
use crate::normalize::{normalize_bot, normalize_deal};
use crate::report::{SkipReason, SyncReport};

/// Bots are fetched with a fixed page size and a much lower runaway
/// ceiling than deals; accounts rarely run more than a few dozen bots.
const BOT_PAGE_SIZE: u32 = 100;
const BOT_OFFSET_CEILING: u64 = 5_000;

/// Sync strategy requested by the trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Scheduled background sync: short-circuits when the active deal set
    /// is unchanged.
    Auto,
    /// Forced sync: always runs the incremental fetch.
    Full,
}

/// Drives sync cycles against the remote API and the canonical store.
pub struct SyncOrchestrator {
    repos: Repositories,
    locks: Arc<RwLock<HashMap<String, Arc<Mutex<()>>>>>,
    api_base_url: Option<String>,
}

impl SyncOrchestrator {
    /// Creates an orchestrator over the given repositories.
    #[must_use]
    pub fn new(repos: Repositories) -> Self {
        Self {
            repos,
            locks: Arc::new(RwLock::new(HashMap::new())),
            api_base_url: None,
        }
    }

    /// Overrides the API base URL (useful for testing).
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Runs one deal-sync cycle for a profile.
    ///
    /// Missing credentials and invalid filters are reported as skipped
    /// no-op results, not errors; remote failures and pagination runaways
    /// abort the cycle with the watermark untouched.
    ///
    /// # Errors
    ///
    /// Returns an error on remote-call failure, pagination runaway, or a
    /// store failure.
    pub async fn run_sync(
        &self,
        profile: &Profile,
        mode: SyncMode,
        per_page: Option<u32>,
    ) -> Result<SyncReport> {
        if !profile.has_credentials() {
            tracing::info!(profile_id = %profile.id, "sync skipped: missing credentials");
            return Ok(SyncReport::skipped(profile.id.clone(), SkipReason::MissingCredentials));
        }
        if let Err(err) = validate_profile_filters(profile) {
            tracing::warn!(profile_id = %profile.id, %err, "sync skipped: invalid filters");
            return Ok(SyncReport::skipped(
                profile.id.clone(),
                SkipReason::InvalidFilters(err.to_string()),
            ));
        }

        let lock = self.profile_lock(&profile.id).await;
        let _guard = lock.lock().await;

        let client = Arc::new(self.make_client(profile)?);
        let settings = &profile.sync;
        let watermark = self.repos.sync_status.get(&profile.id).await?;

        let active = client
            .get_deals(&DealQuery::active(settings.active_per_page))
            .await?;
        let active_ids: HashSet<i64> = active.iter().map(|deal| deal.id).collect();
        let previous_ids: HashSet<i64> = watermark.active_deal_ids.iter().copied().collect();

        let mut new_last_sync_time = watermark.last_sync_time;

        let merged: Vec<RawDeal> = if mode == SyncMode::Auto && active_ids == previous_ids {
            tracing::debug!(
                profile_id = %profile.id,
                active = active.len(),
                "active deal set unchanged, skipping incremental fetch"
            );
            active
        } else {
            let page_size = per_page.unwrap_or(settings.per_page);
            let since = watermark.last_sync_time.unwrap_or(0);

            let incremental = Paginator::new(page_size, settings.offset_ceiling)
                .fetch_all(
                    |page| {
                        let client = Arc::clone(&client);
                        async move {
                            client
                                .get_deals(&DealQuery::updated(page.limit, page.offset))
                                .await
                        }
                    },
                    // Pages are ordered by update time descending, so the
                    // last record of a page is its oldest.
                    |page: &[RawDeal]| {
                        page.last()
                            .is_some_and(|deal| deal.updated_at.timestamp_millis() <= since)
                    },
                )
                .await?;

            // The first record of the first page is the most recently
            // updated record seen this cycle, captured before any
            // filtering or merging.
            if let Some(first) = incremental.first() {
                new_last_sync_time = Some(first.updated_at.timestamp_millis());
            }

            // Active deals are always included even when older than the
            // watermark; the incremental record wins on overlap since it
            // was fetched later.
            let mut by_id: HashMap<i64, RawDeal> = HashMap::new();
            for deal in active {
                by_id.insert(deal.id, deal);
            }
            for deal in incremental {
                by_id.insert(deal.id, deal);
            }
            by_id.into_values().collect()
        };

        let manual_orders = self
            .reconcile_manual_orders(&client, &merged, settings.reconcile_concurrency)
            .await?;

        let now = Utc::now();
        let empty = ManualOrders::default();
        let canonical: Vec<CanonicalDeal> = merged
            .iter()
            .map(|raw| {
                let manual = manual_orders.get(&raw.id).unwrap_or(&empty);
                normalize_deal(raw, manual, now)
            })
            .collect();

        self.repos.deals.upsert_batch(&canonical).await?;

        let mut new_ids: Vec<i64> = active_ids.into_iter().collect();
        new_ids.sort_unstable();
        let new_watermark = SyncWatermark {
            profile_id: profile.id.clone(),
            last_sync_time: new_last_sync_time,
            active_deal_ids: new_ids,
        };
        if new_watermark != watermark {
            self.repos.sync_status.put(&new_watermark).await?;
        }

        tracing::info!(
            profile_id = %profile.id,
            deals = canonical.len(),
            last_sync_time = ?new_last_sync_time,
            "deal sync completed"
        );
        Ok(SyncReport::completed(
            profile.id.clone(),
            canonical.len(),
            new_last_sync_time,
        ))
    }

    /// Syncs the profile's bots: fetches all pages, normalizes, upserts.
    /// User-authored (`custom`) bot rows are never overwritten.
    ///
    /// # Returns
    ///
    /// The number of bots normalized.
    ///
    /// # Errors
    ///
    /// Returns an error on remote or store failure.
    pub async fn run_bot_sync(&self, profile: &Profile) -> Result<usize> {
        if !profile.has_credentials() {
            tracing::info!(profile_id = %profile.id, "bot sync skipped: missing credentials");
            return Ok(0);
        }

        let lock = self.profile_lock(&profile.id).await;
        let _guard = lock.lock().await;

        let client = Arc::new(self.make_client(profile)?);
        let raw_bots = Paginator::new(BOT_PAGE_SIZE, BOT_OFFSET_CEILING)
            .fetch_all(
                |page| {
                    let client = Arc::clone(&client);
                    async move { client.get_bots(page.limit, page.offset).await }
                },
                |_page| false,
            )
            .await?;

        let bots: Vec<_> = raw_bots.iter().map(normalize_bot).collect();
        self.repos.bots.upsert_batch(&bots).await?;

        tracing::info!(profile_id = %profile.id, bots = bots.len(), "bot sync completed");
        Ok(bots.len())
    }

    /// Syncs balance rows for the profile's enabled accounts.
    ///
    /// # Errors
    ///
    /// Returns an error on remote or store failure.
    pub async fn run_account_sync(&self, profile: &Profile) -> Result<usize> {
        if !profile.has_credentials() {
            tracing::info!(profile_id = %profile.id, "account sync skipped: missing credentials");
            return Ok(0);
        }

        let lock = self.profile_lock(&profile.id).await;
        let _guard = lock.lock().await;

        let client = self.make_client(profile)?;
        accounts::sync_account_balances(&client, profile, &self.repos.balances).await
    }

    /// Fans out manual-order reconciliation across the deals that need it,
    /// bounded by `concurrency`. Any remote failure aborts the whole
    /// cycle; remaining in-flight reconciliations are dropped.
    async fn reconcile_manual_orders(
        &self,
        client: &Arc<ThreeCommasClient>,
        deals: &[RawDeal],
        concurrency: usize,
    ) -> Result<HashMap<i64, ManualOrders>> {
        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
        let mut tasks: JoinSet<Result<(i64, ManualOrders)>> = JoinSet::new();

        for deal in deals.iter().filter(|d| d.needs_market_order_reconciliation()) {
            let client = Arc::clone(client);
            let semaphore = Arc::clone(&semaphore);
            let deal_id = deal.id;
            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .context("reconciliation semaphore closed")?;
                let orders = market_orders::reconcile(&client, deal_id).await?;
                Ok((deal_id, orders))
            });
        }

        let mut results = HashMap::new();
        while let Some(joined) = tasks.join_next().await {
            let (deal_id, orders) = joined.context("reconciliation task panicked")??;
            results.insert(deal_id, orders);
        }
        Ok(results)
    }

    async fn profile_lock(&self, profile_id: &str) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.read().await.get(profile_id) {
            return Arc::clone(lock);
        }
        let mut locks = self.locks.write().await;
        Arc::clone(
            locks
                .entry(profile_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    fn make_client(&self, profile: &Profile) -> Result<ThreeCommasClient> {
        let client = ThreeCommasClient::for_profile(profile)?;
        Ok(match &self.api_base_url {
            Some(url) => client.with_base_url(url.clone()),
            None => client,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use botsync_core::config::{ApiConfig, ApiMode, ReservedFund, SyncSettings};
    use botsync_data::Database;
    use rust_decimal::Decimal;
    use secrecy::SecretString;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SCOPE_UPDATED: &str = "active, completed, finished";

    fn profile(per_page: u32) -> Profile {
        Profile {
            id: "p1".into(),
            name: "test".into(),
            api: ApiConfig {
                key: "k".into(),
                secret: SecretString::from("s"),
                mode: ApiMode::Real,
            },
            reserved_funds: vec![ReservedFund {
                id: 3,
                account_name: "binance-main".into(),
                reserved: Decimal::ZERO,
                is_enabled: true,
            }],
            currency_filter: vec!["USDT".into()],
            start_date: None,
            sync: SyncSettings {
                per_page,
                active_per_page: 300,
                offset_ceiling: 250_000,
                reconcile_concurrency: 2,
            },
        }
    }

    fn deal_json(id: i64, updated_at: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "bot_id": 7,
            "account_id": 3,
            "pair": "USDT_ETH",
            "created_at": "2024-03-01T00:00:00Z",
            "updated_at": updated_at,
            "base_order_volume": "10",
            "safety_order_volume": "5",
            "bought_volume": "10",
            "max_safety_orders": 2,
            "martingale_volume_coefficient": "2",
        })
    }

    fn millis(timestamp: &str) -> i64 {
        timestamp
            .parse::<chrono::DateTime<Utc>>()
            .expect("timestamp")
            .timestamp_millis()
    }

    async fn orchestrator(server: &MockServer) -> (SyncOrchestrator, Repositories) {
        let db = Database::new_in_memory().await.expect("db");
        let repos = Repositories::new(&db);
        let orchestrator = SyncOrchestrator::new(repos.clone()).with_api_base_url(server.uri());
        (orchestrator, repos)
    }

    #[tokio::test]
    async fn missing_credentials_is_a_skipped_noop() {
        let server = MockServer::start().await;
        let (orchestrator, _) = orchestrator(&server).await;

        let mut profile = profile(1000);
        profile.api.key.clear();

        let report = orchestrator
            .run_sync(&profile, SyncMode::Auto, None)
            .await
            .expect("report");
        assert_eq!(report.skipped, Some(SkipReason::MissingCredentials));
        assert_eq!(report.deals_synced, 0);
    }

    #[tokio::test]
    async fn invalid_filters_are_a_skipped_noop() {
        let server = MockServer::start().await;
        let (orchestrator, _) = orchestrator(&server).await;

        let mut profile = profile(1000);
        profile.currency_filter = vec!["USDT".into(), "BTC".into()];

        let report = orchestrator
            .run_sync(&profile, SyncMode::Auto, None)
            .await
            .expect("report");
        assert!(matches!(report.skipped, Some(SkipReason::InvalidFilters(_))));
    }

    #[tokio::test]
    async fn autosync_short_circuits_when_active_set_unchanged() {
        let server = MockServer::start().await;
        let (orchestrator, repos) = orchestrator(&server).await;

        let prior = SyncWatermark {
            profile_id: "p1".into(),
            last_sync_time: Some(millis("2024-03-01T06:00:00Z")),
            active_deal_ids: vec![5, 6],
        };
        repos.sync_status.put(&prior).await.expect("seed watermark");

        Mock::given(method("GET"))
            .and(path("/public/api/ver1/deals"))
            .and(query_param("scope", "active"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                deal_json(5, "2024-03-01T05:00:00Z"),
                deal_json(6, "2024-03-01T05:30:00Z"),
            ])))
            .expect(1)
            .mount(&server)
            .await;

        // The incremental scope must never be requested.
        Mock::given(method("GET"))
            .and(path("/public/api/ver1/deals"))
            .and(query_param("scope", SCOPE_UPDATED))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let report = orchestrator
            .run_sync(&profile(1000), SyncMode::Auto, None)
            .await
            .expect("report");

        assert_eq!(report.deals_synced, 2);
        assert_eq!(report.last_sync_time, prior.last_sync_time);
        assert_eq!(repos.deals.count().await.expect("count"), 2);
        assert_eq!(
            repos.sync_status.get("p1").await.expect("watermark"),
            prior
        );
    }

    #[tokio::test]
    async fn full_sync_advances_watermark_to_first_record() {
        let server = MockServer::start().await;
        let (orchestrator, repos) = orchestrator(&server).await;

        Mock::given(method("GET"))
            .and(path("/public/api/ver1/deals"))
            .and(query_param("scope", "active"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/public/api/ver1/deals"))
            .and(query_param("scope", SCOPE_UPDATED))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                deal_json(9, "2024-03-01T12:00:00Z"),
                deal_json(8, "2024-03-01T11:00:00Z"),
            ])))
            .mount(&server)
            .await;

        let report = orchestrator
            .run_sync(&profile(1000), SyncMode::Full, None)
            .await
            .expect("report");

        let expected = millis("2024-03-01T12:00:00Z");
        assert_eq!(report.deals_synced, 2);
        assert_eq!(report.last_sync_time, Some(expected));

        let stored = repos.sync_status.get("p1").await.expect("watermark");
        assert_eq!(stored.last_sync_time, Some(expected));
        assert!(stored.active_deal_ids.is_empty());
    }

    #[tokio::test]
    async fn watermark_stop_predicate_halts_pagination() {
        let server = MockServer::start().await;
        let (orchestrator, repos) = orchestrator(&server).await;

        let since = millis("2024-03-01T06:00:00Z");
        repos
            .sync_status
            .put(&SyncWatermark {
                profile_id: "p1".into(),
                last_sync_time: Some(since),
                active_deal_ids: vec![],
            })
            .await
            .expect("seed watermark");

        Mock::given(method("GET"))
            .and(path("/public/api/ver1/deals"))
            .and(query_param("scope", "active"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        // First page: both records newer than the watermark, full page.
        Mock::given(method("GET"))
            .and(path("/public/api/ver1/deals"))
            .and(query_param("scope", SCOPE_UPDATED))
            .and(query_param("offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                deal_json(9, "2024-03-01T12:00:00Z"),
                deal_json(8, "2024-03-01T11:00:00Z"),
            ])))
            .expect(1)
            .mount(&server)
            .await;

        // Second page: oldest record at/before the watermark, stop here.
        Mock::given(method("GET"))
            .and(path("/public/api/ver1/deals"))
            .and(query_param("scope", SCOPE_UPDATED))
            .and(query_param("offset", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                deal_json(7, "2024-03-01T07:00:00Z"),
                deal_json(6, "2024-03-01T06:00:00Z"),
            ])))
            .expect(1)
            .mount(&server)
            .await;

        // No third page may be requested.
        Mock::given(method("GET"))
            .and(path("/public/api/ver1/deals"))
            .and(query_param("scope", SCOPE_UPDATED))
            .and(query_param("offset", "4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let report = orchestrator
            .run_sync(&profile(2), SyncMode::Full, Some(2))
            .await
            .expect("report");

        assert_eq!(report.deals_synced, 4);
        assert_eq!(report.last_sync_time, Some(millis("2024-03-01T12:00:00Z")));
    }

    #[tokio::test]
    async fn failed_cycle_leaves_watermark_untouched() {
        let server = MockServer::start().await;
        let (orchestrator, repos) = orchestrator(&server).await;

        let prior = SyncWatermark {
            profile_id: "p1".into(),
            last_sync_time: Some(millis("2024-03-01T06:00:00Z")),
            active_deal_ids: vec![5],
        };
        repos.sync_status.put(&prior).await.expect("seed watermark");

        Mock::given(method("GET"))
            .and(path("/public/api/ver1/deals"))
            .respond_with(ResponseTemplate::new(500).set_body_string("remote down"))
            .mount(&server)
            .await;

        let result = orchestrator.run_sync(&profile(1000), SyncMode::Full, None).await;
        assert!(result.is_err());

        assert_eq!(repos.sync_status.get("p1").await.expect("watermark"), prior);
        assert_eq!(repos.deals.count().await.expect("count"), 0);
    }

    #[tokio::test]
    async fn changed_active_set_falls_through_to_incremental() {
        let server = MockServer::start().await;
        let (orchestrator, repos) = orchestrator(&server).await;

        repos
            .sync_status
            .put(&SyncWatermark {
                profile_id: "p1".into(),
                last_sync_time: Some(millis("2024-03-01T06:00:00Z")),
                active_deal_ids: vec![5],
            })
            .await
            .expect("seed watermark");

        Mock::given(method("GET"))
            .and(path("/public/api/ver1/deals"))
            .and(query_param("scope", "active"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                deal_json(5, "2024-03-01T05:00:00Z"),
                deal_json(6, "2024-03-01T08:00:00Z"),
            ])))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/public/api/ver1/deals"))
            .and(query_param("scope", SCOPE_UPDATED))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                deal_json(7, "2024-03-01T12:00:00Z"),
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let report = orchestrator
            .run_sync(&profile(1000), SyncMode::Auto, None)
            .await
            .expect("report");

        assert_eq!(report.deals_synced, 3);
        let stored = repos.sync_status.get("p1").await.expect("watermark");
        assert_eq!(stored.active_deal_ids, vec![5, 6]);
        assert_eq!(stored.last_sync_time, Some(millis("2024-03-01T12:00:00Z")));
    }

    #[tokio::test]
    async fn manual_orders_are_reconciled_into_the_record() {
        let server = MockServer::start().await;
        let (orchestrator, repos) = orchestrator(&server).await;

        let mut deal = deal_json(42, "2024-03-01T12:00:00Z");
        deal.as_object_mut()
            .unwrap()
            .insert("active_manual_safety_orders".into(), serde_json::json!(1));

        Mock::given(method("GET"))
            .and(path("/public/api/ver1/deals"))
            .and(query_param("scope", "active"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([deal])))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/public/api/ver1/deals"))
            .and(query_param("scope", SCOPE_UPDATED))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/public/api/ver1/deals/42/market_orders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"deal_order_type": "Manual Safety", "status_string": "Filled",
                 "quantity": "1", "rate": "10", "total": "10"},
                {"deal_order_type": "Manual Safety", "status_string": "Active",
                 "quantity": "2", "rate": "5"},
            ])))
            .expect(1)
            .mount(&server)
            .await;

        orchestrator
            .run_sync(&profile(1000), SyncMode::Full, None)
            .await
            .expect("report");

        let stored = repos.deals.get(42).await.expect("get").expect("present");
        assert_eq!(stored.completed_manual_safety_orders_count, 1);
        // Ladder (10 + 5 + 10) plus the active manual order's 10.
        assert_eq!(
            stored.max_deal_funds,
            Some(rust_decimal_macros::dec!(35))
        );
    }

    #[tokio::test]
    async fn bot_sync_normalizes_and_persists() {
        let server = MockServer::start().await;
        let (orchestrator, repos) = orchestrator(&server).await;

        Mock::given(method("GET"))
            .and(path("/public/api/ver1/bots"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "id": 7,
                    "account_id": 3,
                    "name": "accumulator",
                    "is_enabled": true,
                    "pairs": ["USDT_ETH"],
                    "type": "Bot::Single",
                    "created_at": "2024-01-15T09:00:00Z",
                    "updated_at": "2024-03-01T09:00:00Z",
                    "max_safety_orders": 2,
                    "max_active_deals": 4,
                    "base_order_volume": "10",
                    "safety_order_volume": "5",
                    "martingale_volume_coefficient": "2",
                }
            ])))
            .mount(&server)
            .await;

        let synced = orchestrator
            .run_bot_sync(&profile(1000))
            .await
            .expect("bot sync");
        assert_eq!(synced, 1);

        let bot = repos.bots.get(7).await.expect("get").expect("present");
        assert_eq!(bot.max_funds, rust_decimal_macros::dec!(100));
        assert_eq!(bot.kind, "Single");
    }

    #[tokio::test]
    async fn account_sync_replaces_snapshot() {
        let server = MockServer::start().await;
        let (orchestrator, repos) = orchestrator(&server).await;

        Mock::given(method("GET"))
            .and(path("/public/api/ver1/accounts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 3, "name": "binance-main", "exchange_name": "Binance"},
                {"id": 4, "name": "disabled-account"},
            ])))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/public/api/ver1/accounts/3/load_balances"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/public/api/ver1/accounts/3/account_table_data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"account_id": 3, "currency_code": "USDT", "currency_slug": "usdt",
                 "position": "500", "usd_value": "500"},
            ])))
            .mount(&server)
            .await;

        let rows = orchestrator
            .run_account_sync(&profile(1000))
            .await
            .expect("account sync");
        assert_eq!(rows, 1);

        let stored = repos.balances.list().await.expect("list");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].account_name, "binance-main");
    }
}
