//! Manual safety-order reconciliation.
//!
//! The deals endpoint reports manual safety-order counts unreliably, so
//! any deal carrying manual orders is cross-checked against its
//! market-orders endpoint: manual orders are classified by fill status and
//! the authoritative counts and totals flow back into normalization.
//!
//! A single order with an unparsable numeric field is dropped from its
//! bucket with a warning; the surrounding deal still completes.

use botsync_threecommas::types::{MarketOrderStatus, MarketOrderType, RawMarketOrder};
use botsync_threecommas::{Result, ThreeCommasClient};
use rust_decimal::Decimal;
use std::str::FromStr;

/// One coerced market order.
#[derive(Debug, Clone, PartialEq)]
pub struct DealOrder {
    pub order_type: MarketOrderType,
    pub status: MarketOrderStatus,
    pub quantity: Decimal,
    pub quantity_remaining: Decimal,
    /// Fill rate; falls back to the average price for orders that report
    /// a zero rate (market orders do not use the rate field).
    pub rate: Decimal,
    pub average_price: Decimal,
    /// Order value. Computed as `rate * quantity` for active orders the
    /// API returns without a total.
    pub total: Decimal,
}

/// Manual safety orders bucketed by fill status.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManualOrders {
    pub filled: Vec<DealOrder>,
    pub failed: Vec<DealOrder>,
    pub active: Vec<DealOrder>,
}

impl ManualOrders {
    /// Totals of the still-active manual orders, as consumed by the
    /// capacity formula.
    #[must_use]
    pub fn active_totals(&self) -> Vec<Decimal> {
        self.active.iter().map(|o| o.total).collect()
    }
}

/// Fetches and classifies the manual safety orders of one deal.
///
/// # Errors
///
/// Returns an error if the market-orders call fails. Individual malformed
/// orders do not error; they are dropped with a warning.
pub async fn reconcile(client: &ThreeCommasClient, deal_id: i64) -> Result<ManualOrders> {
    let raw = client.get_deal_market_orders(deal_id).await?;
    Ok(classify_manual_orders(deal_id, &raw))
}

/// Fetches every order of a deal, coerced but unfiltered.
///
/// # Errors
///
/// Returns an error if the market-orders call fails.
pub async fn fetch_deal_orders(client: &ThreeCommasClient, deal_id: i64) -> Result<Vec<DealOrder>> {
    let raw = client.get_deal_market_orders(deal_id).await?;
    Ok(raw
        .iter()
        .filter_map(|order| coerce_order(deal_id, order))
        .collect())
}

/// Classifies raw orders into manual-order buckets. Pure; exposed for
/// testing and reuse by [`reconcile`].
#[must_use]
pub fn classify_manual_orders(deal_id: i64, raw: &[RawMarketOrder]) -> ManualOrders {
    let mut buckets = ManualOrders::default();

    for order in raw {
        if order.deal_order_type != MarketOrderType::ManualSafety {
            continue;
        }
        let Some(coerced) = coerce_order(deal_id, order) else {
            continue;
        };
        match coerced.status {
            MarketOrderStatus::Filled => buckets.filled.push(coerced),
            MarketOrderStatus::Cancelled => buckets.failed.push(coerced),
            MarketOrderStatus::Active => buckets.active.push(coerced),
            MarketOrderStatus::Unknown => {
                tracing::debug!(deal_id, "ignoring manual order with unknown status");
            }
        }
    }

    buckets
}

/// Coerces one raw order's numeric strings, applying the rate fallback and
/// the missing-total computation. Returns `None` (with a warning) when a
/// field fails to parse.
fn coerce_order(deal_id: i64, raw: &RawMarketOrder) -> Option<DealOrder> {
    let quantity = parse_field(deal_id, "quantity", &raw.quantity)?;
    let quantity_remaining = parse_field(deal_id, "quantity_remaining", &raw.quantity_remaining)?;
    let raw_rate = parse_field(deal_id, "rate", &raw.rate)?;
    let average_price = parse_field(deal_id, "average_price", &raw.average_price)?;

    let rate = if raw_rate.is_zero() { average_price } else { raw_rate };

    let total = match raw.total.as_deref() {
        Some(text) if !text.trim().is_empty() => parse_field(deal_id, "total", text)?,
        _ if raw.status_string == MarketOrderStatus::Active && !rate.is_zero() => rate * quantity,
        _ => Decimal::ZERO,
    };

    Some(DealOrder {
        order_type: raw.deal_order_type,
        status: raw.status_string,
        quantity,
        quantity_remaining,
        rate,
        average_price,
        total,
    })
}

fn parse_field(deal_id: i64, field: &str, value: &str) -> Option<Decimal> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(Decimal::ZERO);
    }
    match Decimal::from_str(trimmed) {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!(deal_id, field, value, "dropping market order with unparsable field");
            None
        }
    }
}
