//! Canonical bot record.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Where a bot row came from.
///
/// Synced bots are fully replaced on every cycle; custom bots are
/// user-authored planning entries the sync path must never overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotOrigin {
    Sync,
    Custom,
}

impl BotOrigin {
    /// Stable column value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::Custom => "custom",
        }
    }
}

/// A normalized bot, keyed by the remote bot id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalBot {
    pub id: i64,
    pub origin: BotOrigin,
    pub account_id: i64,
    pub account_name: String,
    pub name: String,

    /// Bot flavor decoded at the API boundary (`Single`, `Composite`, ...).
    pub kind: String,
    pub is_enabled: bool,
    pub strategy: String,

    /// Traded symbols, comma-joined (quote segment stripped).
    pub pairs: String,
    /// Funding currency taken from the first pair token.
    pub from_currency: String,
    pub profit_currency: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    pub max_active_deals: u32,
    pub active_deals_count: u32,
    pub finished_deals_count: u32,
    pub max_safety_orders: u32,
    pub active_safety_orders_count: u32,

    pub base_order_volume: Decimal,
    pub base_order_volume_type: Option<String>,
    pub safety_order_volume: Decimal,
    pub safety_order_volume_type: Option<String>,
    pub safety_order_step_percentage: Decimal,
    pub martingale_volume_coefficient: Decimal,
    pub martingale_step_coefficient: Decimal,

    pub take_profit: Decimal,
    pub take_profit_type: Option<String>,
    pub trailing_deviation: Option<Decimal>,
    pub stop_loss_percentage: Option<Decimal>,

    pub active_deals_usd_profit: Decimal,
    pub finished_deals_profit_usd: Decimal,

    /// Single-deal capital ceiling from the safety-order geometry.
    pub max_funds_per_deal: Decimal,
    /// Bot-wide capital ceiling.
    pub max_funds: Decimal,
    /// Capital reserved but not currently deployed, clamped at zero.
    pub max_inactive_funds: Decimal,
    /// Deployed capital when enabled, zero when disabled.
    pub enabled_active_funds: Decimal,
    /// Idle reserve when enabled, zero when disabled.
    pub enabled_inactive_funds: Decimal,
    /// Cumulative drawdown tolerance across the safety-order ladder.
    pub price_deviation: Decimal,
}
