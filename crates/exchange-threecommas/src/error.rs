//! Error types for 3Commas API integration.
//!
//! The taxonomy mirrors how the sync engine reacts: missing credentials
//! skip a profile, transient remote failures abort a cycle and wait for
//! the next scheduled attempt, and a pagination runaway is fatal and
//! reported separately so "remote down" and "stop condition never met"
//! stay distinguishable.

use thiserror::Error;

/// Errors that can occur when interacting with 3Commas.
#[derive(Debug, Error)]
pub enum ThreeCommasError {
    /// API key or secret missing from the profile.
    #[error("missing API credentials for profile")]
    MissingCredentials,

    /// HMAC signing failed.
    #[error("request signing error: {0}")]
    Signing(String),

    /// API request failed.
    #[error("API error: {status_code} - {message}")]
    Api {
        /// HTTP status code.
        status_code: u16,
        /// Error message from API.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retry.
        retry_after_secs: u64,
    },

    /// Network error.
    #[error("network error: {0}")]
    Network(String),

    /// Request timeout.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Pagination offset ceiling reached without satisfying the stop
    /// condition. Fatal for the cycle; indicates clock skew or a logic
    /// bug, not a remote outage.
    #[error("pagination runaway: offset {offset} reached ceiling {ceiling}")]
    PaginationRunaway {
        /// Offset at which fetching was aborted.
        offset: u64,
        /// Configured ceiling.
        ceiling: u64,
    },
}

impl ThreeCommasError {
    /// Creates an API error from status code and message.
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status_code,
            message: message.into(),
        }
    }

    /// Creates a rate limit error.
    #[must_use]
    pub fn rate_limited(retry_after_secs: u64) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    /// Creates a pagination runaway error.
    #[must_use]
    pub fn pagination_runaway(offset: u64, ceiling: u64) -> Self {
        Self::PaginationRunaway { offset, ceiling }
    }

    /// Returns true if a later sync cycle may succeed without operator
    /// intervention.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) | Self::RateLimited { .. } => true,
            Self::Api { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ThreeCommasError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Network(format!("connection failed: {err}"))
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ThreeCommasError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias for 3Commas operations.
pub type Result<T> = std::result::Result<T, ThreeCommasError>;
