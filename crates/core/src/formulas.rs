//! Financial formulas shared by the deal and bot normalizers.
//!
//! All functions are pure and total over their documented domains: a zero
//! safety-order count yields base-order-only capital, and zero durations
//! clamp to zero instead of producing negative hours. Monetary math uses
//! `rust_decimal::Decimal`; geometric series are loop-accumulated so no
//! float exponentiation is involved.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Milliseconds per hour, used to express deal durations as fractional hours.
const MILLIS_PER_HOUR: i64 = 3_600_000;

/// Elapsed duration of a deal in fractional hours.
///
/// For closed deals pass `closed_at`; for active deals pass the current
/// time. Clock skew that would produce a negative duration clamps to zero.
#[must_use]
pub fn deal_hours(created_at: DateTime<Utc>, closed_at_or_now: DateTime<Utc>) -> Decimal {
    let millis = (closed_at_or_now - created_at).num_milliseconds().max(0);
    Decimal::from(millis) / Decimal::from(MILLIS_PER_HOUR)
}

/// Maximum capital a single deal of a bot can absorb.
///
/// Base order volume plus the full safety-order ladder, each step's volume
/// scaled geometrically by the martingale volume coefficient:
///
/// ```text
/// base + safety * mvc^0 + safety * mvc^1 + ... + safety * mvc^(n-1)
/// ```
///
/// `max_safety_orders = 0` returns the base order volume alone.
#[must_use]
pub fn max_deal_funds_for_bot(
    max_safety_orders: u32,
    base_volume: Decimal,
    safety_volume: Decimal,
    martingale_volume_coefficient: Decimal,
) -> Decimal {
    let mut funds = base_volume;
    let mut step_volume = safety_volume;
    for _ in 0..max_safety_orders {
        funds += step_volume;
        step_volume *= martingale_volume_coefficient;
    }
    funds
}

/// Remaining capital at risk for an open deal.
///
/// Funds already deployed (`bought_volume`, which includes filled manual
/// safety orders) plus the unfilled remainder of the automatic ladder and
/// the totals reserved by still-active manual safety orders. If the base
/// order has not fully filled yet, `base_volume` is used as the floor for
/// deployed funds so capacity never understates the base order.
///
/// With `bought_volume = base_volume`, no completed safety orders, and no
/// manual orders this reduces exactly to [`max_deal_funds_for_bot`], so
/// bot-level and deal-level figures reconcile.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn max_deal_funds_for_deal(
    bought_volume: Decimal,
    base_volume: Decimal,
    safety_volume: Decimal,
    max_safety_orders: u32,
    completed_safety_orders: u32,
    martingale_volume_coefficient: Decimal,
    active_manual_totals: &[Decimal],
) -> Decimal {
    let deployed = bought_volume.max(base_volume);

    // Volume of the ladder steps that have not filled yet. The coefficient
    // is advanced through the completed steps first so step i always
    // carries safety * mvc^i.
    let mut remaining = Decimal::ZERO;
    let mut step_volume = safety_volume;
    for i in 0..max_safety_orders {
        if i >= completed_safety_orders {
            remaining += step_volume;
        }
        step_volume *= martingale_volume_coefficient;
    }

    let manual: Decimal = active_manual_totals.iter().copied().sum();
    deployed + remaining + manual
}

/// Bot-wide capital ceiling: per-deal ceiling times the deal slots.
#[must_use]
pub fn max_bot_funds(max_deal_funds: Decimal, max_active_deals: u32) -> Decimal {
    max_deal_funds * Decimal::from(max_active_deals)
}

/// Capital reserved by the bot but not currently deployed.
///
/// Clamped at zero: a bot running more deals than its configured maximum
/// (possible transiently after a settings change) reports no idle funds
/// rather than a negative reserve.
#[must_use]
pub fn max_inactive_funds(
    max_deal_funds: Decimal,
    max_active_deals: u32,
    active_deals_count: u32,
) -> Decimal {
    let idle_slots = max_active_deals.saturating_sub(active_deals_count);
    max_deal_funds * Decimal::from(idle_slots)
}

/// Cumulative percentage drawdown tolerated before the last safety order
/// triggers.
///
/// Each ladder step's deviation is the step percentage scaled geometrically
/// by the martingale step coefficient.
#[must_use]
pub fn price_deviation(
    max_safety_orders: u32,
    step_percentage: Decimal,
    martingale_step_coefficient: Decimal,
) -> Decimal {
    let mut deviation = Decimal::ZERO;
    let mut step = step_percentage;
    for _ in 0..max_safety_orders {
        deviation += step;
        step *= martingale_step_coefficient;
    }
    deviation
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn deal_hours_closed_deal() {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let closed = Utc.with_ymd_and_hms(2024, 3, 1, 16, 30, 0).unwrap();
        assert_eq!(deal_hours(created, closed), dec!(6.5));
    }

    #[test]
    fn deal_hours_clamps_negative_duration() {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let earlier = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        assert_eq!(deal_hours(created, earlier), Decimal::ZERO);
    }

    #[test]
    fn bot_funds_geometric_doubling() {
        // 10 + 5*2^0 + 5*2^1 = 25
        let funds = max_deal_funds_for_bot(2, dec!(10), dec!(5), dec!(2));
        assert_eq!(funds, dec!(25));
    }

    #[test]
    fn bot_funds_zero_safety_orders_is_base_only() {
        let funds = max_deal_funds_for_bot(0, dec!(10), dec!(5), dec!(2));
        assert_eq!(funds, dec!(10));
    }

    #[test]
    fn bot_funds_fractional_coefficient() {
        // 100 + 50 + 75 + 112.5
        let funds = max_deal_funds_for_bot(3, dec!(100), dec!(50), dec!(1.5));
        assert_eq!(funds, dec!(337.5));
    }

    #[test]
    fn deal_funds_reduces_to_bot_formula_when_fresh() {
        let bot = max_deal_funds_for_bot(3, dec!(10), dec!(5), dec!(2));
        let deal = max_deal_funds_for_deal(dec!(10), dec!(10), dec!(5), 3, 0, dec!(2), &[]);
        assert_eq!(bot, deal);
    }

    #[test]
    fn deal_funds_skips_completed_ladder_steps() {
        // bought 25 covers base + first SO; remaining ladder is 5*2^1 = 10.
        let funds = max_deal_funds_for_deal(dec!(25), dec!(10), dec!(5), 2, 1, dec!(2), &[]);
        assert_eq!(funds, dec!(35));
    }

    #[test]
    fn deal_funds_counts_active_manual_orders() {
        let funds = max_deal_funds_for_deal(
            dec!(10),
            dec!(10),
            dec!(5),
            0,
            0,
            dec!(2),
            &[dec!(7.5), dec!(2.5)],
        );
        assert_eq!(funds, dec!(20));
    }

    #[test]
    fn deal_funds_floors_deployed_at_base_volume() {
        // Base order only partially filled: bought 4 of a 10 base.
        let funds = max_deal_funds_for_deal(dec!(4), dec!(10), dec!(5), 1, 0, dec!(2), &[]);
        assert_eq!(funds, dec!(15));
    }

    #[test]
    fn max_bot_funds_multiplies_slots() {
        assert_eq!(max_bot_funds(dec!(25), 4), dec!(100));
    }

    #[test]
    fn inactive_funds_counts_idle_slots() {
        assert_eq!(max_inactive_funds(dec!(25), 4, 1), dec!(75));
    }

    #[test]
    fn inactive_funds_clamps_at_zero() {
        assert_eq!(max_inactive_funds(dec!(25), 2, 5), Decimal::ZERO);
    }

    #[test]
    fn price_deviation_geometric_series() {
        // 1.5 + 1.5*1.2 + 1.5*1.44 = 5.46
        let dev = price_deviation(3, dec!(1.5), dec!(1.2));
        assert_eq!(dev, dec!(5.46));
    }

    #[test]
    fn price_deviation_zero_safety_orders() {
        assert_eq!(price_deviation(0, dec!(1.5), dec!(1.2)), Decimal::ZERO);
    }
}
