//! Canonical deal record.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A normalized deal, keyed by the remote deal id.
///
/// Passthrough fields are copied from the raw payload after type coercion;
/// derived fields (`deal_hours`, `profit_percent`, `max_deal_funds`,
/// `impact_factor`, the recomputed manual-order count and the repaired
/// `max_safety_orders`) are produced by the deal normalizer. A deal moves
/// from active (`closed_at = None`) to closed exactly once; closed deals'
/// financial fields never change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalDeal {
    pub id: i64,
    pub bot_id: i64,
    pub account_id: i64,
    pub bot_name: String,
    pub account_name: String,

    /// Traded symbol, the second segment of the raw pair token.
    pub pair: String,
    /// Funding (quote) currency, the first segment of the raw pair token.
    pub currency: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    /// Close timestamp as epoch millis, for range filters in SQL.
    pub closed_at_millis: Option<i64>,

    pub finished: bool,
    pub status: String,
    pub strategy: String,
    pub deal_has_error: bool,
    pub error_message: Option<String>,

    pub take_profit: Decimal,
    pub base_order_volume: Decimal,
    pub safety_order_volume: Decimal,
    pub safety_order_step_percentage: Decimal,

    pub bought_amount: Decimal,
    pub bought_volume: Decimal,
    pub bought_average_price: Decimal,
    pub sold_amount: Decimal,
    pub sold_volume: Decimal,
    pub sold_average_price: Decimal,

    pub final_profit: Decimal,
    pub final_profit_percentage: Decimal,
    pub actual_profit: Decimal,
    pub actual_usd_profit: Decimal,
    pub usd_final_profit: Decimal,

    /// Repaired ladder size: at least completed + currently active safety
    /// orders, even when the raw payload undercounts.
    pub max_safety_orders: u32,
    pub active_safety_orders_count: u32,
    pub current_active_safety_orders: u32,
    pub completed_safety_orders_count: u32,
    /// Recomputed from reconciled manual fills, overriding the raw count.
    pub completed_manual_safety_orders_count: u32,
    pub active_manual_safety_orders: u32,

    pub martingale_volume_coefficient: Decimal,
    pub martingale_step_coefficient: Decimal,
    pub stop_loss_percentage: Option<Decimal>,
    pub current_price: Decimal,
    pub take_profit_price: Option<Decimal>,

    /// Elapsed open-to-close (or open-to-now) duration in fractional hours.
    pub deal_hours: Decimal,
    /// Hourly-normalized return for closed deals; `None` while active or
    /// when the deal closed within the same millisecond it opened.
    pub profit_percent: Option<Decimal>,
    /// Capital at risk including unfilled safety orders; `None` once
    /// closed.
    pub max_deal_funds: Option<Decimal>,
    /// Price-impact heuristic; active deals only.
    pub impact_factor: Option<f64>,
    /// USD profit realized at close; `None` while active.
    pub realized_actual_profit_usd: Option<Decimal>,
}

impl CanonicalDeal {
    /// Canonical closed/active predicate.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }
}
