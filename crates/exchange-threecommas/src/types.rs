//! Raw payload types for the 3Commas API.
//!
//! The API encodes most numeric fields as strings and some as bare JSON
//! numbers, so monetary fields deserialize through a permissive
//! string-or-number coercion into `Decimal`. Enumerated fields (`scope`,
//! bot type, order status) are decoded once here into closed enums;
//! downstream code never re-parses the raw strings.
//!
//! Market-order numerics are the one exception: they stay as raw strings
//! because reconciliation must drop an individual unparsable order with a
//! warning instead of failing the whole response (see the engine crate).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

// =============================================================================
// Numeric Coercion
// =============================================================================

/// Deserializes a `Decimal` from a string, a JSON number, or null
/// (null/empty coerce to zero).
pub(crate) fn decimal_from_any<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(Decimal::ZERO),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(Decimal::ZERO),
        Some(serde_json::Value::String(s)) => {
            Decimal::from_str(s.trim()).map_err(D::Error::custom)
        }
        Some(serde_json::Value::Number(n)) => {
            Decimal::from_str(&n.to_string()).map_err(D::Error::custom)
        }
        Some(other) => Err(D::Error::custom(format!(
            "expected numeric field, got {other}"
        ))),
    }
}

/// Like [`decimal_from_any`] but preserves absence: null/missing/empty
/// become `None`.
pub(crate) fn opt_decimal_from_any<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => Decimal::from_str(s.trim())
            .map(Some)
            .map_err(D::Error::custom),
        Some(serde_json::Value::Number(n)) => Decimal::from_str(&n.to_string())
            .map(Some)
            .map_err(D::Error::custom),
        Some(other) => Err(D::Error::custom(format!(
            "expected numeric field, got {other}"
        ))),
    }
}

// =============================================================================
// Enumerations (decoded once at the boundary)
// =============================================================================

/// Deal scope filter accepted by the deals endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealScope {
    /// Open deals only.
    Active,
    /// Deals closed with profit.
    Completed,
    /// Deals that reached a terminal state.
    Finished,
    /// Union used by incremental sync: active, completed and finished.
    Updated,
}

impl DealScope {
    /// Query-parameter value understood by the API.
    #[must_use]
    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Finished => "finished",
            Self::Updated => "active, completed, finished",
        }
    }
}

/// Sort direction for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    #[must_use]
    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Bot flavor, decoded from the API's `"Bot::Single"` / `"Bot::Composite"`
/// type strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BotKind {
    Single,
    Composite,
    /// Unrecognized type string; carried through rather than dropped.
    Unknown,
}

impl BotKind {
    /// Stable name used for persistence and display.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::Composite => "Composite",
            Self::Unknown => "Unknown",
        }
    }
}

impl<'de> Deserialize<'de> for BotKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let tail = raw.rsplit("::").next().unwrap_or(&raw);
        Ok(match tail {
            "Single" => Self::Single,
            "Composite" => Self::Composite,
            _ => Self::Unknown,
        })
    }
}

/// Market-order role within a deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarketOrderType {
    Base,
    Safety,
    ManualSafety,
    TakeProfit,
    StopLoss,
    Unknown,
}

impl<'de> Deserialize<'de> for MarketOrderType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "Base" => Self::Base,
            "Safety" => Self::Safety,
            "Manual Safety" => Self::ManualSafety,
            "Take Profit" => Self::TakeProfit,
            "Stop Loss" => Self::StopLoss,
            _ => Self::Unknown,
        })
    }
}

/// Market-order lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarketOrderStatus {
    Filled,
    Cancelled,
    Active,
    Unknown,
}

impl<'de> Deserialize<'de> for MarketOrderStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "Filled" => Self::Filled,
            "Cancelled" => Self::Cancelled,
            "Active" => Self::Active,
            _ => Self::Unknown,
        })
    }
}

// =============================================================================
// Deals
// =============================================================================

/// Raw deal payload from the deals endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDeal {
    pub id: i64,
    pub bot_id: i64,
    pub account_id: i64,

    #[serde(default)]
    pub bot_name: String,
    #[serde(default)]
    pub account_name: String,

    /// Combined `"QUOTE_BASE"` pair token, e.g. `"USDT_BTC"`.
    pub pair: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,

    /// Terminal-state flag reported by the API. Carried through but never
    /// used as the closed/active predicate; `closed_at` is canonical.
    #[serde(rename = "finished?", default)]
    pub finished: bool,
    #[serde(rename = "cancellable?", default)]
    pub cancellable: bool,
    #[serde(rename = "panic_sellable?", default)]
    pub panic_sellable: bool,

    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub localized_status: Option<String>,
    #[serde(default)]
    pub strategy: String,
    #[serde(default)]
    pub deal_has_error: bool,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub failed_message: Option<String>,

    #[serde(default)]
    pub profit_currency: Option<String>,
    #[serde(default)]
    pub from_currency: Option<String>,
    #[serde(default)]
    pub to_currency: Option<String>,

    #[serde(default, deserialize_with = "decimal_from_any")]
    pub take_profit: Decimal,
    #[serde(default)]
    pub take_profit_type: Option<String>,

    #[serde(default, deserialize_with = "decimal_from_any")]
    pub base_order_volume: Decimal,
    #[serde(default, deserialize_with = "decimal_from_any")]
    pub safety_order_volume: Decimal,
    #[serde(default, deserialize_with = "decimal_from_any")]
    pub safety_order_step_percentage: Decimal,

    #[serde(default, deserialize_with = "decimal_from_any")]
    pub bought_amount: Decimal,
    #[serde(default, deserialize_with = "decimal_from_any")]
    pub bought_volume: Decimal,
    #[serde(default, deserialize_with = "decimal_from_any")]
    pub bought_average_price: Decimal,
    #[serde(default, deserialize_with = "decimal_from_any")]
    pub base_order_average_price: Decimal,

    #[serde(default, deserialize_with = "decimal_from_any")]
    pub sold_amount: Decimal,
    #[serde(default, deserialize_with = "decimal_from_any")]
    pub sold_volume: Decimal,
    #[serde(default, deserialize_with = "decimal_from_any")]
    pub sold_average_price: Decimal,

    #[serde(default, deserialize_with = "decimal_from_any")]
    pub final_profit: Decimal,
    #[serde(default, deserialize_with = "decimal_from_any")]
    pub final_profit_percentage: Decimal,
    #[serde(default, deserialize_with = "decimal_from_any")]
    pub actual_profit: Decimal,
    #[serde(default, deserialize_with = "decimal_from_any")]
    pub actual_profit_percentage: Decimal,
    #[serde(default, deserialize_with = "decimal_from_any")]
    pub actual_usd_profit: Decimal,
    #[serde(default, deserialize_with = "decimal_from_any")]
    pub usd_final_profit: Decimal,

    #[serde(default)]
    pub max_safety_orders: u32,
    #[serde(default)]
    pub active_safety_orders_count: u32,
    #[serde(default)]
    pub current_active_safety_orders: u32,
    #[serde(default)]
    pub completed_safety_orders_count: u32,
    #[serde(default)]
    pub completed_manual_safety_orders_count: u32,
    #[serde(default)]
    pub active_manual_safety_orders: u32,

    #[serde(default, deserialize_with = "decimal_from_any")]
    pub martingale_volume_coefficient: Decimal,
    #[serde(default, deserialize_with = "decimal_from_any")]
    pub martingale_step_coefficient: Decimal,

    #[serde(default, deserialize_with = "opt_decimal_from_any")]
    pub stop_loss_percentage: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal_from_any")]
    pub take_profit_price: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal_from_any")]
    pub stop_loss_price: Option<Decimal>,

    #[serde(default, deserialize_with = "decimal_from_any")]
    pub current_price: Decimal,

    #[serde(default, deserialize_with = "decimal_from_any")]
    pub reserved_base_coin: Decimal,
    #[serde(default, deserialize_with = "decimal_from_any")]
    pub reserved_second_coin: Decimal,

    #[serde(default)]
    pub trailing_enabled: bool,
    #[serde(default)]
    pub tsl_enabled: bool,
}

impl RawDeal {
    /// Canonical closed/active predicate: a deal is closed once the API
    /// reports a close timestamp.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }

    /// True when the deal has manual safety orders that need
    /// reconciliation against the market-orders endpoint.
    #[must_use]
    pub fn needs_market_order_reconciliation(&self) -> bool {
        self.active_manual_safety_orders > 0 || self.completed_manual_safety_orders_count > 0
    }
}

/// Parameters for one deals-endpoint page.
#[derive(Debug, Clone, Copy)]
pub struct DealQuery {
    pub scope: DealScope,
    pub direction: SortOrder,
    pub limit: u32,
    pub offset: u64,
}

impl DealQuery {
    /// Active-scope snapshot query (single page, no explicit ordering).
    #[must_use]
    pub fn active(limit: u32) -> Self {
        Self {
            scope: DealScope::Active,
            direction: SortOrder::Desc,
            limit,
            offset: 0,
        }
    }

    /// Incremental-sync page query ordered by update time descending.
    #[must_use]
    pub fn updated(limit: u32, offset: u64) -> Self {
        Self {
            scope: DealScope::Updated,
            direction: SortOrder::Desc,
            limit,
            offset,
        }
    }
}

/// Deal write-back request for the update endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateDealRequest {
    #[serde(skip)]
    pub deal_id: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss_percentage: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_safety_orders: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailing_enabled: Option<bool>,
}

// =============================================================================
// Bots
// =============================================================================

/// Raw bot payload from the bots endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBot {
    pub id: i64,
    pub account_id: i64,

    #[serde(default)]
    pub account_name: String,
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub is_enabled: bool,

    /// Pair tokens, each `"QUOTE_BASE"`.
    #[serde(default)]
    pub pairs: Vec<String>,

    #[serde(rename = "type", default = "BotKind::unknown")]
    pub kind: BotKind,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub max_safety_orders: u32,
    #[serde(default)]
    pub active_safety_orders_count: u32,
    #[serde(default)]
    pub max_active_deals: u32,
    #[serde(default)]
    pub active_deals_count: u32,
    #[serde(default)]
    pub finished_deals_count: u32,

    #[serde(default, deserialize_with = "decimal_from_any")]
    pub base_order_volume: Decimal,
    #[serde(default)]
    pub base_order_volume_type: Option<String>,
    #[serde(default, deserialize_with = "decimal_from_any")]
    pub safety_order_volume: Decimal,
    #[serde(default)]
    pub safety_order_volume_type: Option<String>,
    #[serde(default, deserialize_with = "decimal_from_any")]
    pub safety_order_step_percentage: Decimal,

    #[serde(default, deserialize_with = "decimal_from_any")]
    pub martingale_volume_coefficient: Decimal,
    #[serde(default, deserialize_with = "decimal_from_any")]
    pub martingale_step_coefficient: Decimal,

    #[serde(default, deserialize_with = "decimal_from_any")]
    pub take_profit: Decimal,
    #[serde(default)]
    pub take_profit_type: Option<String>,
    #[serde(default, deserialize_with = "opt_decimal_from_any")]
    pub trailing_deviation: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal_from_any")]
    pub stop_loss_percentage: Option<Decimal>,

    #[serde(default)]
    pub profit_currency: Option<String>,
    #[serde(default, deserialize_with = "decimal_from_any")]
    pub finished_deals_profit_usd: Decimal,
    #[serde(default, deserialize_with = "decimal_from_any")]
    pub active_deals_usd_profit: Decimal,

    #[serde(default)]
    pub strategy: String,
}

impl BotKind {
    fn unknown() -> Self {
        Self::Unknown
    }
}

// =============================================================================
// Market Orders
// =============================================================================

/// Raw safety-order record from the per-deal market-orders endpoint.
///
/// Monetary fields stay as strings; reconciliation coerces them and drops
/// individual unparsable orders instead of failing the response.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMarketOrder {
    #[serde(default)]
    pub order_id: Option<String>,

    pub deal_order_type: MarketOrderType,
    pub status_string: MarketOrderStatus,

    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub quantity_remaining: String,
    #[serde(default)]
    pub total: Option<String>,
    #[serde(default)]
    pub rate: String,
    #[serde(default)]
    pub average_price: String,
}

// =============================================================================
// Accounts
// =============================================================================

/// Raw exchange-account record.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAccount {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub exchange_name: Option<String>,
    #[serde(default)]
    pub market_code: Option<String>,
}

/// One currency row from the account table-data endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAccountTableRow {
    pub account_id: i64,
    pub currency_code: String,
    #[serde(default)]
    pub currency_slug: String,

    #[serde(default, deserialize_with = "decimal_from_any")]
    pub percentage: Decimal,
    #[serde(default, deserialize_with = "decimal_from_any")]
    pub position: Decimal,
    #[serde(default, deserialize_with = "decimal_from_any")]
    pub on_orders: Decimal,
    #[serde(default, deserialize_with = "decimal_from_any")]
    pub btc_value: Decimal,
    #[serde(default, deserialize_with = "decimal_from_any")]
    pub usd_value: Decimal,
}

// =============================================================================
// Pair Splitting
// =============================================================================

/// Splits a combined `"QUOTE_BASE"` pair token into
/// `(quote_currency, traded_symbol)`.
///
/// Tokens without an underscore yield the whole token as the symbol and an
/// empty quote currency.
#[must_use]
pub fn split_pair(pair: &str) -> (String, String) {
    match pair.split_once('_') {
        Some((quote, base)) => (quote.to_string(), base.to_string()),
        None => (String::new(), pair.to_string()),
    }
}
