//! HMAC-SHA256 authentication for the 3Commas API.
//!
//! Every request carries an `Apikey` header and a `Signature` header: the
//! hex-encoded HMAC-SHA256 digest of the request path (including the query
//! string, and the body for POST requests) keyed by the API secret.
//!
//! Secrets are held in [`SecretString`] and never logged.

use crate::error::{Result, ThreeCommasError};
use botsync_core::config::Profile;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

// =============================================================================
// Signed Headers
// =============================================================================

/// Headers required for authenticated 3Commas API requests.
#[derive(Debug, Clone)]
pub struct SignedHeaders {
    /// `Apikey` header value.
    pub api_key: String,

    /// `Signature` header value (hex-encoded HMAC-SHA256).
    pub signature: String,
}

// =============================================================================
// Authentication Handler
// =============================================================================

/// Signs 3Commas API requests with a profile's credentials.
pub struct ThreeCommasAuth {
    api_key: String,
    secret: SecretString,
}

impl std::fmt::Debug for ThreeCommasAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreeCommasAuth")
            .field("api_key", &self.api_key)
            .finish_non_exhaustive()
    }
}

impl ThreeCommasAuth {
    /// Creates an auth handler from raw credentials.
    #[must_use]
    pub fn new(api_key: impl Into<String>, secret: SecretString) -> Self {
        Self {
            api_key: api_key.into(),
            secret,
        }
    }

    /// Creates an auth handler from a profile's credential block.
    ///
    /// # Errors
    ///
    /// Returns [`ThreeCommasError::MissingCredentials`] if the key or
    /// secret is empty.
    pub fn from_profile(profile: &Profile) -> Result<Self> {
        if !profile.has_credentials() {
            return Err(ThreeCommasError::MissingCredentials);
        }
        Ok(Self::new(
            profile.api.key.clone(),
            SecretString::from(profile.api.secret.expose_secret().to_owned()),
        ))
    }

    /// Signs a request over `path_and_query` plus the request body.
    ///
    /// # Errors
    ///
    /// Returns [`ThreeCommasError::Signing`] if the HMAC cannot be keyed.
    pub fn sign_request(&self, path_and_query: &str, body: &str) -> Result<SignedHeaders> {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|e| ThreeCommasError::Signing(e.to_string()))?;
        mac.update(path_and_query.as_bytes());
        mac.update(body.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        Ok(SignedHeaders {
            api_key: self.api_key.clone(),
            signature,
        })
    }
}
