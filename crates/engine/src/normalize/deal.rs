//! Deal normalization.
//!
//! Maps a raw deal payload plus its reconciled manual orders into the
//! canonical record. The mapping is a pure function of its inputs, so
//! applying the same page twice yields identical records; every derived
//! field is computed here and nowhere else.

use botsync_core::formulas;
use botsync_data::models::CanonicalDeal;
use botsync_threecommas::types::{split_pair, RawDeal};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::market_orders::ManualOrders;

/// Dampening exponent applied to bought volume in the impact heuristic.
const VOLUME_DAMPING_EXPONENT: f64 = 0.618;

/// Scale constant of the impact heuristic.
const IMPACT_SCALE: f64 = 415.0;

/// Normalizes one raw deal.
///
/// `manual_orders` must already be reconciled for deals that carry manual
/// safety orders; pass an empty set otherwise. `now` anchors duration
/// computations for active deals so a whole page normalizes against one
/// clock reading.
#[must_use]
pub fn normalize_deal(raw: &RawDeal, manual_orders: &ManualOrders, now: DateTime<Utc>) -> CanonicalDeal {
    let closed = raw.is_closed();
    let (currency, pair) = split_pair(&raw.pair);

    // The API can report fewer max safety orders than the counts it also
    // reports as completed/active, which would zero out the ladder in the
    // capacity formula. Take the larger of reported and computed.
    let max_safety_orders = raw
        .max_safety_orders
        .max(raw.completed_safety_orders_count + raw.current_active_safety_orders);

    let deal_hours = formulas::deal_hours(raw.created_at, raw.closed_at.unwrap_or(now));

    let profit_percent = if closed && !deal_hours.is_zero() {
        Some(((raw.final_profit_percentage / Decimal::ONE_HUNDRED) / deal_hours).round_dp(3))
    } else {
        None
    };

    let max_deal_funds = if closed {
        None
    } else {
        Some(formulas::max_deal_funds_for_deal(
            raw.bought_volume,
            raw.base_order_volume,
            raw.safety_order_volume,
            max_safety_orders,
            raw.completed_safety_orders_count,
            raw.martingale_volume_coefficient,
            &manual_orders.active_totals(),
        ))
    };

    let impact_factor = if closed { None } else { impact_factor(raw) };

    CanonicalDeal {
        id: raw.id,
        bot_id: raw.bot_id,
        account_id: raw.account_id,
        bot_name: raw.bot_name.clone(),
        account_name: raw.account_name.clone(),
        pair,
        currency,
        created_at: raw.created_at,
        updated_at: raw.updated_at,
        closed_at: raw.closed_at,
        closed_at_millis: raw.closed_at.map(|t| t.timestamp_millis()),
        finished: raw.finished,
        status: raw.status.clone(),
        strategy: raw.strategy.clone(),
        deal_has_error: raw.deal_has_error,
        error_message: raw.error_message.clone(),
        take_profit: raw.take_profit,
        base_order_volume: raw.base_order_volume,
        safety_order_volume: raw.safety_order_volume,
        safety_order_step_percentage: raw.safety_order_step_percentage,
        bought_amount: raw.bought_amount,
        bought_volume: raw.bought_volume,
        bought_average_price: raw.bought_average_price,
        sold_amount: raw.sold_amount,
        sold_volume: raw.sold_volume,
        sold_average_price: raw.sold_average_price,
        final_profit: raw.final_profit,
        final_profit_percentage: raw.final_profit_percentage,
        actual_profit: raw.actual_profit,
        actual_usd_profit: raw.actual_usd_profit,
        usd_final_profit: raw.usd_final_profit,
        max_safety_orders,
        active_safety_orders_count: raw.active_safety_orders_count,
        current_active_safety_orders: raw.current_active_safety_orders,
        completed_safety_orders_count: raw.completed_safety_orders_count,
        completed_manual_safety_orders_count: manual_orders.filled.len() as u32,
        active_manual_safety_orders: raw.active_manual_safety_orders,
        martingale_volume_coefficient: raw.martingale_volume_coefficient,
        martingale_step_coefficient: raw.martingale_step_coefficient,
        stop_loss_percentage: raw.stop_loss_percentage,
        current_price: raw.current_price,
        take_profit_price: raw.take_profit_price,
        deal_hours,
        profit_percent,
        max_deal_funds,
        impact_factor,
        realized_actual_profit_usd: if closed { Some(raw.actual_usd_profit) } else { None },
    }
}

/// Price-impact heuristic for active deals: price drift scaled by a
/// volume-dampening term, normalized by the USD-to-base profit ratio.
/// Undefined (and `None`) when any denominator is zero.
fn impact_factor(raw: &RawDeal) -> Option<f64> {
    let bought_average_price = raw.bought_average_price.to_f64()?;
    let current_price = raw.current_price.to_f64()?;
    let bought_volume = raw.bought_volume.to_f64()?;
    let usd_profit = raw.actual_usd_profit.to_f64()?;
    let base_profit = raw.actual_profit.to_f64()?;

    if bought_average_price == 0.0 || bought_volume <= 0.0 || base_profit == 0.0 || usd_profit == 0.0
    {
        return None;
    }

    let drift = (bought_average_price - current_price) / bought_average_price;
    let dampening = IMPACT_SCALE / bought_volume.powf(VOLUME_DAMPING_EXPONENT);
    let currency_ratio = usd_profit / base_profit;

    Some(drift * dampening / currency_ratio)
}
