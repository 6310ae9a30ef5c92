//! Account summary command.

use anyhow::Result;
use botsync_core::ProfileLoader;
use botsync_threecommas::ThreeCommasClient;

/// Prints the accounts visible to the profile's API key, for filling in
/// the profile's reserved-funds section.
pub async fn run(profile_path: &str) -> Result<()> {
    let profile = ProfileLoader::load(profile_path)?;
    let client = ThreeCommasClient::for_profile(&profile)?;

    let accounts = client.get_accounts().await?;
    if accounts.is_empty() {
        println!("no accounts visible to this API key");
        return Ok(());
    }

    println!("{:>10}  {:<24} {}", "id", "name", "exchange");
    for account in accounts {
        println!(
            "{:>10}  {:<24} {}",
            account.id,
            account.name,
            account.exchange_name.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}
