//! 3Commas REST API client with rate limiting.
//!
//! Provides typed access to the bots, deals, market-orders and accounts
//! endpoints with automatic rate limiting using the governor crate. All
//! requests are signed (see [`crate::auth`]); numeric payload fields are
//! coerced at deserialization (see [`crate::types`]).

use crate::auth::ThreeCommasAuth;
use crate::error::{Result, ThreeCommasError};
use crate::types::{
    DealQuery, RawAccount, RawAccountTableRow, RawBot, RawDeal, RawMarketOrder, UpdateDealRequest,
};
use botsync_core::config::{ApiMode, Profile};
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::Client;
use serde::Serialize;
use std::num::NonZeroU32;
use std::sync::Arc;

// =============================================================================
// Constants
// =============================================================================

/// 3Commas API base URL.
pub const THREE_COMMAS_URL: &str = "https://api.3commas.io";

const API_PREFIX: &str = "/public/api/ver1";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the 3Commas client.
#[derive(Debug, Clone)]
pub struct ThreeCommasClientConfig {
    /// Base URL for the API.
    pub base_url: String,

    /// Trading mode header applied to every request.
    pub mode: ApiMode,

    /// Requests per minute limit.
    pub requests_per_minute: NonZeroU32,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ThreeCommasClientConfig {
    fn default() -> Self {
        Self {
            base_url: THREE_COMMAS_URL.to_string(),
            mode: ApiMode::Real,
            requests_per_minute: nonzero!(100u32),
            timeout_secs: 30,
        }
    }
}

impl ThreeCommasClientConfig {
    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the trading mode.
    #[must_use]
    pub fn with_mode(mut self, mode: ApiMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the rate limit.
    #[must_use]
    pub fn with_rate_limit(mut self, requests_per_minute: NonZeroU32) -> Self {
        self.requests_per_minute = requests_per_minute;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

// =============================================================================
// ThreeCommasClient
// =============================================================================

/// 3Commas REST API client.
pub struct ThreeCommasClient {
    config: ThreeCommasClientConfig,
    http: Client,
    rate_limiter: Arc<
        RateLimiter<
            governor::state::NotKeyed,
            governor::state::InMemoryState,
            governor::clock::DefaultClock,
        >,
    >,
    auth: ThreeCommasAuth,
}

impl std::fmt::Debug for ThreeCommasClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreeCommasClient")
            .field("base_url", &self.config.base_url)
            .field("requests_per_minute", &self.config.requests_per_minute)
            .finish_non_exhaustive()
    }
}

impl ThreeCommasClient {
    /// Creates a new client with the given configuration and credentials.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: ThreeCommasClientConfig, auth: ThreeCommasAuth) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ThreeCommasError::Network(format!("failed to build HTTP client: {e}")))?;

        let quota = Quota::per_minute(config.requests_per_minute);
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self {
            config,
            http,
            rate_limiter,
            auth,
        })
    }

    /// Creates a client for a profile, using its credentials and mode.
    ///
    /// # Errors
    ///
    /// Returns [`ThreeCommasError::MissingCredentials`] if the profile has
    /// no usable key/secret pair.
    pub fn for_profile(profile: &Profile) -> Result<Self> {
        let auth = ThreeCommasAuth::from_profile(profile)?;
        let config = ThreeCommasClientConfig::default().with_mode(profile.api.mode);
        Self::new(config, auth)
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Sets a custom base URL (useful for testing).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Waits for the rate limiter and makes a signed GET request.
    async fn get<T: serde::de::DeserializeOwned>(&self, path_and_query: &str) -> Result<T> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}{}", self.config.base_url, path_and_query);
        let headers = self.auth.sign_request(path_and_query, "")?;

        tracing::debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .header("Apikey", &headers.api_key)
            .header("Signature", &headers.signature)
            .header("Forced-Mode", self.config.mode.as_header_value())
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Waits for the rate limiter and makes a signed POST request.
    async fn post<T: serde::de::DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}{}", self.config.base_url, path);
        let body_json = serde_json::to_string(body)?;
        let headers = self.auth.sign_request(path, &body_json)?;

        tracing::debug!("POST {} body_len={}", url, body_json.len());

        let response = self
            .http
            .post(&url)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .header("Apikey", &headers.api_key)
            .header("Signature", &headers.signature)
            .header("Forced-Mode", self.config.mode.as_header_value())
            .body(body_json)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Handles API response, converting errors appropriately.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(ThreeCommasError::rate_limited(retry_after));
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ThreeCommasError::api(status.as_u16(), text));
        }

        let body = response.json::<T>().await?;
        Ok(body)
    }

    // =========================================================================
    // Deal Endpoints
    // =========================================================================

    /// Fetches one page of deals.
    ///
    /// # Errors
    ///
    /// Returns error if the API call fails.
    pub async fn get_deals(&self, query: &DealQuery) -> Result<Vec<RawDeal>> {
        let path = format!(
            "{API_PREFIX}/deals?limit={}&offset={}&order=updated_at&order_direction={}&scope={}",
            query.limit,
            query.offset,
            query.direction.as_query_value(),
            encode_query_value(query.scope.as_query_value()),
        );
        self.get(&path).await
    }

    /// Fetches the safety-order records for one deal
    /// (the market-orders endpoint).
    ///
    /// # Errors
    ///
    /// Returns error if the API call fails.
    pub async fn get_deal_market_orders(&self, deal_id: i64) -> Result<Vec<RawMarketOrder>> {
        let path = format!("{API_PREFIX}/deals/{deal_id}/market_orders");
        self.get(&path).await
    }

    /// Updates an open deal's parameters on the remote side.
    ///
    /// # Errors
    ///
    /// Returns error if the deal is not updatable or the API call fails.
    pub async fn update_deal(&self, request: &UpdateDealRequest) -> Result<RawDeal> {
        let path = format!("{API_PREFIX}/deals/{}/update_deal", request.deal_id);
        self.post(&path, request).await
    }

    // =========================================================================
    // Bot Endpoints
    // =========================================================================

    /// Fetches one page of bots, ordered by update time descending.
    ///
    /// # Errors
    ///
    /// Returns error if the API call fails.
    pub async fn get_bots(&self, limit: u32, offset: u64) -> Result<Vec<RawBot>> {
        let path = format!(
            "{API_PREFIX}/bots?limit={limit}&offset={offset}&sort_by=updated_at&sort_direction=desc"
        );
        self.get(&path).await
    }

    // =========================================================================
    // Account Endpoints
    // =========================================================================

    /// Lists all exchange accounts connected to the API key.
    ///
    /// # Errors
    ///
    /// Returns error if the API call fails.
    pub async fn get_accounts(&self) -> Result<Vec<RawAccount>> {
        self.get(&format!("{API_PREFIX}/accounts")).await
    }

    /// Asks the API to refresh an account's balances from the exchange.
    ///
    /// # Errors
    ///
    /// Returns error if the API call fails.
    pub async fn load_balances(&self, account_id: i64) -> Result<()> {
        let path = format!("{API_PREFIX}/accounts/{account_id}/load_balances");
        let _: serde_json::Value = self.post(&path, &serde_json::json!({})).await?;
        Ok(())
    }

    /// Fetches per-currency balance rows for an account.
    ///
    /// # Errors
    ///
    /// Returns error if the API call fails.
    pub async fn account_table_data(&self, account_id: i64) -> Result<Vec<RawAccountTableRow>> {
        let path = format!("{API_PREFIX}/accounts/{account_id}/account_table_data");
        self.post(&path, &serde_json::json!({})).await
    }
}

/// Percent-encodes the characters the scope value needs (spaces only; the
/// remaining query values are fixed tokens).
fn encode_query_value(value: &str) -> String {
    value.replace(' ', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DealScope;
    use secrecy::SecretString;
    use wiremock::matchers::{header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> ThreeCommasClient {
        let auth = ThreeCommasAuth::new("test-key", SecretString::from("test-secret"));
        ThreeCommasClient::new(ThreeCommasClientConfig::default(), auth)
            .expect("client builds")
            .with_base_url(base_url)
    }

    #[test]
    fn config_builder() {
        let config = ThreeCommasClientConfig::default()
            .with_base_url("https://custom.url")
            .with_mode(ApiMode::Paper)
            .with_rate_limit(nonzero!(50u32))
            .with_timeout_secs(10);
        assert_eq!(config.base_url, "https://custom.url");
        assert_eq!(config.mode, ApiMode::Paper);
        assert_eq!(config.requests_per_minute.get(), 50);
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn scope_encoding_replaces_spaces() {
        assert_eq!(
            encode_query_value(DealScope::Updated.as_query_value()),
            "active,%20completed,%20finished"
        );
    }

    #[tokio::test]
    async fn get_deals_parses_page_and_signs_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/public/api/ver1/deals"))
            .and(query_param("limit", "2"))
            .and(query_param("scope", "active"))
            .and(header_exists("Apikey"))
            .and(header_exists("Signature"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "id": 100,
                    "bot_id": 7,
                    "account_id": 3,
                    "pair": "USDT_ETH",
                    "created_at": "2024-03-01T10:00:00Z",
                    "updated_at": "2024-03-01T11:00:00Z",
                    "bought_volume": "150.5",
                    "max_safety_orders": 3
                }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let deals = client
            .get_deals(&DealQuery::active(2))
            .await
            .expect("deals fetch");

        assert_eq!(deals.len(), 1);
        assert_eq!(deals[0].id, 100);
        assert!(!deals[0].is_closed());
    }

    #[tokio::test]
    async fn rate_limited_response_maps_to_typed_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/public/api/ver1/bots"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "17"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.get_bots(10, 0).await.expect_err("rate limited");
        assert!(matches!(
            err,
            ThreeCommasError::RateLimited {
                retry_after_secs: 17
            }
        ));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn server_error_maps_to_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/public/api/ver1/accounts"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.get_accounts().await.expect_err("server error");
        assert!(matches!(
            err,
            ThreeCommasError::Api {
                status_code: 500,
                ..
            }
        ));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn market_orders_endpoint_uses_deal_path() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/public/api/ver1/deals/42/market_orders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "deal_order_type": "Manual Safety",
                    "status_string": "Active",
                    "quantity": "2",
                    "rate": "10.5"
                }
            ])))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let orders = client.get_deal_market_orders(42).await.expect("orders");
        assert_eq!(orders.len(), 1);
    }

    #[tokio::test]
    async fn update_deal_posts_only_set_fields() {
        use wiremock::matchers::body_json;

        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/public/api/ver1/deals/42/update_deal"))
            .and(body_json(serde_json::json!({"take_profit": "2.5"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 42,
                "bot_id": 7,
                "account_id": 3,
                "pair": "USDT_ETH",
                "created_at": "2024-03-01T10:00:00Z",
                "updated_at": "2024-03-01T11:00:00Z",
                "take_profit": "2.5"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let request = UpdateDealRequest {
            deal_id: 42,
            take_profit: Some(rust_decimal_macros::dec!(2.5)),
            stop_loss_percentage: None,
            max_safety_orders: None,
            trailing_enabled: None,
        };
        let deal = client.update_deal(&request).await.expect("update");
        assert_eq!(deal.id, 42);
    }

    #[tokio::test]
    async fn account_table_data_posts_and_parses_rows() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/public/api/ver1/accounts/5/account_table_data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "account_id": 5,
                    "currency_code": "USDT",
                    "currency_slug": "usdt",
                    "position": 1200.5,
                    "on_orders": "250",
                    "usd_value": 1450.5
                }
            ])))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let rows = client.account_table_data(5).await.expect("rows");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].currency_code, "USDT");
    }
}
