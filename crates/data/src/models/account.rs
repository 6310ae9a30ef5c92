//! Account balance rows.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One currency position on one exchange account, keyed by
/// `"{account_id}-{currency_slug}"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub id: String,
    pub account_id: i64,
    pub account_name: String,
    pub exchange_name: Option<String>,
    pub market_code: Option<String>,

    pub currency_code: String,
    pub currency_slug: String,

    /// Share of the account's value held in this currency.
    pub percentage: Decimal,
    pub position: Decimal,
    pub on_orders: Decimal,
    pub btc_value: Decimal,
    pub usd_value: Decimal,
}

impl AccountBalance {
    /// Builds the composite row key.
    #[must_use]
    pub fn key(account_id: i64, currency_slug: &str) -> String {
        format!("{account_id}-{currency_slug}")
    }
}
