//! Local bot listing command.

use anyhow::Result;
use botsync_data::{Database, Repositories};

/// Prints the bots currently in the local store.
pub async fn run(database_url: &str) -> Result<()> {
    let db = Database::new(database_url).await?;
    let repos = Repositories::new(&db);

    let bots = repos.bots.list().await?;
    if bots.is_empty() {
        println!("no bots synced yet");
        return Ok(());
    }

    println!(
        "{:>10}  {:<24} {:<10} {:<8} {:>12}  {}",
        "id", "name", "kind", "enabled", "max funds", "pairs"
    );
    for bot in bots {
        println!(
            "{:>10}  {:<24} {:<10} {:<8} {:>12}  {}",
            bot.id,
            bot.name,
            bot.kind,
            if bot.is_enabled { "yes" } else { "no" },
            bot.max_funds.to_string(),
            bot.pairs,
        );
    }
    Ok(())
}
