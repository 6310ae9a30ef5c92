//! Interval-driven sync loop.
//!
//! Time-based re-attempt is the only retry mechanism: a failed cycle is
//! logged and the next tick retries from the last good watermark. Ctrl-C
//! drops an in-flight cycle before its watermark write, so interrupted
//! state is indistinguishable from a never-started cycle.

use anyhow::Result;
use botsync_core::ProfileLoader;
use botsync_data::{Database, Repositories};
use botsync_engine::{SyncMode, SyncOrchestrator};
use std::time::Duration;
use tokio::time::MissedTickBehavior;

use super::sync::run_cycle;

pub async fn run(
    profile_path: &str,
    interval_secs: u64,
    per_page: Option<u32>,
    database_url: &str,
) -> Result<()> {
    let profile = ProfileLoader::load(profile_path)?;
    let db = Database::new(database_url).await?;
    let orchestrator = SyncOrchestrator::new(Repositories::new(&db));

    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(profile_id = %profile.id, interval_secs, "watch loop started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                tokio::select! {
                    result = run_cycle(&orchestrator, &profile, SyncMode::Auto, per_page) => {
                        match result {
                            Ok(report) => tracing::info!(%report, "cycle finished"),
                            Err(err) => tracing::error!(
                                error = %err,
                                "cycle failed; retrying on next tick from the last good watermark"
                            ),
                        }
                    }
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("interrupted mid-cycle; prior watermark retained");
                        return Ok(());
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown requested");
                return Ok(());
            }
        }
    }
}
