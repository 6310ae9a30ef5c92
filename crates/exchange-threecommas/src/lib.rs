//! 3Commas API integration for the botsync engine.
//!
//! This crate provides:
//! - REST client with rate limiting for the bots, deals, market-orders
//!   and accounts endpoints
//! - HMAC-SHA256 request signing
//! - Offset pagination with stop conditions and a runaway ceiling
//! - Raw payload types with string-to-`Decimal` coercion and closed enums
//!   decoded once at the boundary
//!
//! # Example
//!
//! ```ignore
//! use botsync_threecommas::{ThreeCommasClient, types::DealQuery};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let profile = botsync_core::ProfileLoader::load("profile.toml")?;
//!     let client = ThreeCommasClient::for_profile(&profile)?;
//!
//!     let active = client.get_deals(&DealQuery::active(300)).await?;
//!     println!("{} active deals", active.len());
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod paginate;
pub mod types;

pub use auth::{SignedHeaders, ThreeCommasAuth};
pub use client::{ThreeCommasClient, ThreeCommasClientConfig, THREE_COMMAS_URL};
pub use error::{Result, ThreeCommasError};
pub use paginate::{PageRequest, Paginator};
pub use types::{
    BotKind, DealQuery, DealScope, MarketOrderStatus, MarketOrderType, RawAccount,
    RawAccountTableRow, RawBot, RawDeal, RawMarketOrder, SortOrder, UpdateDealRequest,
};
