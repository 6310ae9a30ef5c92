//! Bot normalization.
//!
//! Pure mapping from a raw bot payload to the canonical record, with the
//! capacity fields computed from the safety-order geometry.

use botsync_core::formulas;
use botsync_data::models::{BotOrigin, CanonicalBot};
use botsync_threecommas::types::{split_pair, RawBot};
use rust_decimal::Decimal;

/// Normalizes one raw bot into a sync-origin canonical record.
#[must_use]
pub fn normalize_bot(raw: &RawBot) -> CanonicalBot {
    let max_funds_per_deal = formulas::max_deal_funds_for_bot(
        raw.max_safety_orders,
        raw.base_order_volume,
        raw.safety_order_volume,
        raw.martingale_volume_coefficient,
    );
    let max_funds = formulas::max_bot_funds(max_funds_per_deal, raw.max_active_deals);
    let max_inactive_funds = formulas::max_inactive_funds(
        max_funds_per_deal,
        raw.max_active_deals,
        raw.active_deals_count,
    );
    let price_deviation = formulas::price_deviation(
        raw.max_safety_orders,
        raw.safety_order_step_percentage,
        raw.martingale_step_coefficient,
    );

    // A disabled bot holds no funds regardless of its configured ladder.
    let (enabled_active_funds, enabled_inactive_funds) = if raw.is_enabled {
        (
            max_funds_per_deal * Decimal::from(raw.active_deals_count),
            max_inactive_funds,
        )
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    };

    let from_currency = raw
        .pairs
        .first()
        .map(|pair| split_pair(pair).0)
        .unwrap_or_default();
    let pairs = raw
        .pairs
        .iter()
        .map(|pair| split_pair(pair).1)
        .collect::<Vec<_>>()
        .join(",");

    CanonicalBot {
        id: raw.id,
        origin: BotOrigin::Sync,
        account_id: raw.account_id,
        account_name: raw.account_name.clone(),
        name: raw.name.clone(),
        kind: raw.kind.as_str().to_string(),
        is_enabled: raw.is_enabled,
        strategy: raw.strategy.clone(),
        pairs,
        from_currency,
        profit_currency: raw.profit_currency.clone(),
        created_at: raw.created_at,
        updated_at: raw.updated_at,
        max_active_deals: raw.max_active_deals,
        active_deals_count: raw.active_deals_count,
        finished_deals_count: raw.finished_deals_count,
        max_safety_orders: raw.max_safety_orders,
        active_safety_orders_count: raw.active_safety_orders_count,
        base_order_volume: raw.base_order_volume,
        base_order_volume_type: raw.base_order_volume_type.clone(),
        safety_order_volume: raw.safety_order_volume,
        safety_order_volume_type: raw.safety_order_volume_type.clone(),
        safety_order_step_percentage: raw.safety_order_step_percentage,
        martingale_volume_coefficient: raw.martingale_volume_coefficient,
        martingale_step_coefficient: raw.martingale_step_coefficient,
        take_profit: raw.take_profit,
        take_profit_type: raw.take_profit_type.clone(),
        trailing_deviation: raw.trailing_deviation,
        stop_loss_percentage: raw.stop_loss_percentage,
        active_deals_usd_profit: raw.active_deals_usd_profit,
        finished_deals_profit_usd: raw.finished_deals_profit_usd,
        max_funds_per_deal,
        max_funds,
        max_inactive_funds,
        enabled_active_funds,
        enabled_inactive_funds,
        price_deviation,
    }
}
