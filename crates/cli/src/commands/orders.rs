//! Per-deal order listing command.

use anyhow::Result;
use botsync_core::ProfileLoader;
use botsync_engine::market_orders::fetch_deal_orders;
use botsync_threecommas::ThreeCommasClient;

/// Prints every order of a deal, coerced and with computed totals.
pub async fn run(profile_path: &str, deal_id: i64) -> Result<()> {
    let profile = ProfileLoader::load(profile_path)?;
    let client = ThreeCommasClient::for_profile(&profile)?;

    let orders = fetch_deal_orders(&client, deal_id).await?;
    if orders.is_empty() {
        println!("no orders for deal {deal_id}");
        return Ok(());
    }

    println!(
        "{:<14} {:<10} {:>14} {:>14} {:>14}",
        "type", "status", "quantity", "rate", "total"
    );
    for order in orders {
        println!(
            "{:<14} {:<10} {:>14} {:>14} {:>14}",
            format!("{:?}", order.order_type),
            format!("{:?}", order.status),
            order.quantity.to_string(),
            order.rate.to_string(),
            order.total.to_string(),
        );
    }
    Ok(())
}
