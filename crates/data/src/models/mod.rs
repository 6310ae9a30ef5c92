//! Data models for the canonical store.

mod account;
mod bot;
mod deal;
mod watermark;

pub use account::AccountBalance;
pub use bot::{BotOrigin, CanonicalBot};
pub use deal::CanonicalDeal;
pub use watermark::SyncWatermark;
