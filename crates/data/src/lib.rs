//! Canonical record store for botsync.
//!
//! This crate provides:
//! - A SQLite database client with schema bootstrap
//! - Data models for deals, bots, account balances, and the per-profile
//!   sync watermark
//! - Repositories with idempotent, transactional batch upserts

pub mod database;
pub mod models;
pub mod repositories;

pub use database::Database;
pub use models::{AccountBalance, BotOrigin, CanonicalBot, CanonicalDeal, SyncWatermark};
pub use repositories::{
    BalanceRepository, BotRepository, DealRepository, Repositories, SyncStatusRepository,
};
