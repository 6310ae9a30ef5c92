//! Profile filter validation.
//!
//! One place for the rules that decide whether a profile's reporting
//! filters are internally consistent. Both the sync engine (before a
//! cycle) and any front end consume this, so the rules are not duplicated
//! per call site.

use crate::config::Profile;
use thiserror::Error;

/// Quote currencies treated as fiat-or-stable. Aggregating these together
/// is meaningful; aggregating them with coin-quoted pairs is not.
const FIAT_QUOTES: &[&str] = &["USD", "USDT", "USDC", "BUSD", "TUSD", "DAI", "EUR", "GBP"];

/// A profile filter inconsistency.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    /// The currency filter is empty, so every aggregate would be empty.
    #[error("currency filter is empty")]
    EmptyCurrencyFilter,

    /// The same currency appears twice in the filter.
    #[error("duplicate currency in filter: {0}")]
    DuplicateCurrency(String),

    /// The filter mixes fiat/stable quotes with coin quotes; sums across
    /// them are meaningless.
    #[error("currency filter mixes fiat/stable quote {fiat} with coin quote {coin}")]
    MixedQuoteCurrencies {
        /// A fiat or stablecoin currency present in the filter.
        fiat: String,
        /// A coin-quoted currency present in the filter.
        coin: String,
    },

    /// No reserved-funds account is enabled.
    #[error("no enabled reserved-funds account")]
    NoEnabledAccounts,

    /// The same account id appears twice in the reserved-funds list.
    #[error("duplicate reserved-funds account id: {0}")]
    DuplicateAccountId(i64),
}

/// Validates a profile's currency filter and reserved-funds accounts.
///
/// # Errors
///
/// Returns the first [`FilterError`] found, in the order: empty filter,
/// duplicate currency, mixed quotes, no enabled accounts, duplicate
/// account id.
pub fn validate_profile_filters(profile: &Profile) -> Result<(), FilterError> {
    if profile.currency_filter.is_empty() {
        return Err(FilterError::EmptyCurrencyFilter);
    }

    let mut seen = std::collections::HashSet::new();
    for currency in &profile.currency_filter {
        if !seen.insert(currency.to_uppercase()) {
            return Err(FilterError::DuplicateCurrency(currency.clone()));
        }
    }

    let fiat = profile
        .currency_filter
        .iter()
        .find(|c| FIAT_QUOTES.contains(&c.to_uppercase().as_str()));
    let coin = profile
        .currency_filter
        .iter()
        .find(|c| !FIAT_QUOTES.contains(&c.to_uppercase().as_str()));
    if let (Some(fiat), Some(coin)) = (fiat, coin) {
        return Err(FilterError::MixedQuoteCurrencies {
            fiat: fiat.clone(),
            coin: coin.clone(),
        });
    }

    if !profile.reserved_funds.is_empty() {
        if profile.enabled_account_ids().is_empty() {
            return Err(FilterError::NoEnabledAccounts);
        }

        let mut seen_ids = std::collections::HashSet::new();
        for fund in &profile.reserved_funds {
            if !seen_ids.insert(fund.id) {
                return Err(FilterError::DuplicateAccountId(fund.id));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(toml: &str) -> Profile {
        toml::from_str(toml).expect("profile parses")
    }

    #[test]
    fn empty_filter_rejected() {
        let p = profile(r#"id = "p""#);
        assert_eq!(
            validate_profile_filters(&p),
            Err(FilterError::EmptyCurrencyFilter)
        );
    }

    #[test]
    fn duplicate_currency_rejected_case_insensitively() {
        let p = profile(
            r#"
            id = "p"
            currency_filter = ["USDT", "usdt"]
            "#,
        );
        assert!(matches!(
            validate_profile_filters(&p),
            Err(FilterError::DuplicateCurrency(_))
        ));
    }

    #[test]
    fn mixed_quotes_rejected() {
        let p = profile(
            r#"
            id = "p"
            currency_filter = ["USDT", "BTC"]
            "#,
        );
        assert!(matches!(
            validate_profile_filters(&p),
            Err(FilterError::MixedQuoteCurrencies { .. })
        ));
    }

    #[test]
    fn coin_only_filter_accepted() {
        let p = profile(
            r#"
            id = "p"
            currency_filter = ["BTC", "ETH"]
            "#,
        );
        assert_eq!(validate_profile_filters(&p), Ok(()));
    }

    #[test]
    fn all_accounts_disabled_rejected() {
        let p = profile(
            r#"
            id = "p"
            currency_filter = ["USDT"]
            [[reserved_funds]]
            id = 1
            is_enabled = false
            "#,
        );
        assert_eq!(
            validate_profile_filters(&p),
            Err(FilterError::NoEnabledAccounts)
        );
    }

    #[test]
    fn duplicate_account_id_rejected() {
        let p = profile(
            r#"
            id = "p"
            currency_filter = ["USDT"]
            [[reserved_funds]]
            id = 1
            is_enabled = true
            [[reserved_funds]]
            id = 1
            is_enabled = true
            "#,
        );
        assert_eq!(
            validate_profile_filters(&p),
            Err(FilterError::DuplicateAccountId(1))
        );
    }

    #[test]
    fn consistent_profile_accepted() {
        let p = profile(
            r#"
            id = "p"
            currency_filter = ["USDT", "BUSD"]
            [[reserved_funds]]
            id = 1
            is_enabled = true
            [[reserved_funds]]
            id = 2
            is_enabled = false
            "#,
        );
        assert_eq!(validate_profile_filters(&p), Ok(()));
    }
}
