//! Sync engine for botsync.
//!
//! This crate provides:
//! - The sync orchestrator: autoSync/full cycle selection, watermark
//!   management, per-profile mutual exclusion
//! - Deal and bot normalization (raw payload to canonical record)
//! - Manual safety-order reconciliation with bounded concurrency
//! - Account balance synchronization
//!
//! # Example
//!
//! ```ignore
//! use botsync_core::ProfileLoader;
//! use botsync_data::{Database, Repositories};
//! use botsync_engine::{SyncMode, SyncOrchestrator};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let profile = ProfileLoader::load("profile.toml")?;
//!     let db = Database::new("sqlite://botsync.db?mode=rwc").await?;
//!     let orchestrator = SyncOrchestrator::new(Repositories::new(&db));
//!
//!     let report = orchestrator.run_sync(&profile, SyncMode::Auto, None).await?;
//!     println!("{report}");
//!     Ok(())
//! }
//! ```

pub mod accounts;
pub mod market_orders;
pub mod normalize;
pub mod orchestrator;
pub mod report;

pub use market_orders::{DealOrder, ManualOrders};
pub use normalize::{normalize_bot, normalize_deal};
pub use orchestrator::{SyncMode, SyncOrchestrator};
pub use report::{SkipReason, SyncReport};
