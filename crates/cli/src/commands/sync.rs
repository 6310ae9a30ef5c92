//! One-shot sync command.

use anyhow::Result;
use botsync_core::ProfileLoader;
use botsync_data::{Database, Repositories};
use botsync_engine::{SyncMode, SyncOrchestrator, SyncReport};

/// Runs one full cycle: deals, then bots, then account balances.
pub async fn run(
    profile_path: &str,
    mode: SyncMode,
    per_page: Option<u32>,
    database_url: &str,
) -> Result<()> {
    let profile = ProfileLoader::load(profile_path)?;
    let db = Database::new(database_url).await?;
    let orchestrator = SyncOrchestrator::new(Repositories::new(&db));

    let report = run_cycle(&orchestrator, &profile, mode, per_page).await?;
    println!("{report}");
    Ok(())
}

/// Shared by `sync` and `watch`: deals first (they drive the watermark),
/// then bots and balances.
pub(crate) async fn run_cycle(
    orchestrator: &SyncOrchestrator,
    profile: &botsync_core::Profile,
    mode: SyncMode,
    per_page: Option<u32>,
) -> Result<SyncReport> {
    let report = orchestrator.run_sync(profile, mode, per_page).await?;

    if report.skipped.is_none() {
        let bots = orchestrator.run_bot_sync(profile).await?;
        let balances = orchestrator.run_account_sync(profile).await?;
        tracing::info!(bots, balances, "bots and balances synced");
    }

    Ok(report)
}
