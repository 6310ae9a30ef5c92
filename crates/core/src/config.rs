//! Per-profile configuration consumed by the sync engine.
//!
//! A profile is a read-only snapshot: API credentials, the reserved-funds
//! accounts enabled for reporting, the quote-currency filter, and sync
//! tuning knobs. The engine never writes back into a profile; mutable sync
//! state (the watermark) lives in the data store instead.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// One sync profile, usually loaded from a TOML file.
#[derive(Debug, Deserialize)]
pub struct Profile {
    /// Stable identifier, used as the watermark key in the store.
    pub id: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// 3Commas API credentials.
    #[serde(default)]
    pub api: ApiConfig,

    /// Exchange accounts whose funds participate in reporting.
    #[serde(default)]
    pub reserved_funds: Vec<ReservedFund>,

    /// Quote currencies included in reporting (e.g. `["USDT", "BUSD"]`).
    #[serde(default)]
    pub currency_filter: Vec<String>,

    /// Deals closed before this date are ignored by downstream reporting.
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,

    /// Sync tuning.
    #[serde(default)]
    pub sync: SyncSettings,
}

impl Profile {
    /// Returns true if both API key and secret are present.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.api.key.is_empty() && !self.api.secret.expose_secret().is_empty()
    }

    /// Ids of the reserved-funds accounts enabled for sync.
    #[must_use]
    pub fn enabled_account_ids(&self) -> Vec<i64> {
        self.reserved_funds
            .iter()
            .filter(|a| a.is_enabled)
            .map(|a| a.id)
            .collect()
    }
}

/// API credential block.
#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    /// API key identifier. Empty means credentials are missing and sync is
    /// skipped for the profile.
    #[serde(default)]
    pub key: String,

    /// API secret used for HMAC request signing.
    #[serde(default = "empty_secret")]
    pub secret: SecretString,

    /// Trading mode forwarded to the API.
    #[serde(default)]
    pub mode: ApiMode,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            secret: empty_secret(),
            mode: ApiMode::default(),
        }
    }
}

fn empty_secret() -> SecretString {
    SecretString::from("")
}

/// 3Commas account mode (`Forced-Mode` header).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiMode {
    #[default]
    Real,
    Paper,
}

impl ApiMode {
    /// Header value understood by the API.
    #[must_use]
    pub fn as_header_value(self) -> &'static str {
        match self {
            Self::Real => "real",
            Self::Paper => "paper",
        }
    }
}

/// A reserved-funds entry: one exchange account and the capital earmarked
/// for the bots trading on it.
#[derive(Debug, Clone, Deserialize)]
pub struct ReservedFund {
    pub id: i64,

    #[serde(default)]
    pub account_name: String,

    /// Capital reserved on this account, in the profile's quote currency.
    #[serde(default)]
    pub reserved: Decimal,

    #[serde(default)]
    pub is_enabled: bool,
}

/// Sync tuning knobs with conservative defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Page size for incremental deal fetches.
    pub per_page: u32,

    /// Page size for the active-scope fetch.
    pub active_per_page: u32,

    /// Hard ceiling on the pagination offset. Reaching it without
    /// satisfying the stop condition is a fatal cycle error.
    pub offset_ceiling: u64,

    /// Maximum concurrent per-deal market-order reconciliations.
    pub reconcile_concurrency: usize,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            per_page: 1000,
            active_per_page: 300,
            offset_ceiling: 250_000,
            reconcile_concurrency: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_from_toml(toml: &str) -> Profile {
        toml::from_str(toml).expect("profile parses")
    }

    #[test]
    fn minimal_profile_defaults() {
        let profile = profile_from_toml(r#"id = "p1""#);
        assert_eq!(profile.id, "p1");
        assert!(!profile.has_credentials());
        assert!(profile.enabled_account_ids().is_empty());
        assert_eq!(profile.sync.per_page, 1000);
        assert_eq!(profile.sync.offset_ceiling, 250_000);
    }

    #[test]
    fn credentials_require_both_key_and_secret() {
        let profile = profile_from_toml(
            r#"
            id = "p1"
            [api]
            key = "k"
            "#,
        );
        assert!(!profile.has_credentials());

        let profile = profile_from_toml(
            r#"
            id = "p1"
            [api]
            key = "k"
            secret = "s"
            "#,
        );
        assert!(profile.has_credentials());
    }

    #[test]
    fn enabled_account_ids_filters_disabled() {
        let profile = profile_from_toml(
            r#"
            id = "p1"
            [[reserved_funds]]
            id = 11
            is_enabled = true
            [[reserved_funds]]
            id = 12
            is_enabled = false
            "#,
        );
        assert_eq!(profile.enabled_account_ids(), vec![11]);
    }

    #[test]
    fn api_mode_header_values() {
        assert_eq!(ApiMode::Real.as_header_value(), "real");
        assert_eq!(ApiMode::Paper.as_header_value(), "paper");
    }
}
