//! Typed repositories over the SQLite store.

mod balance_repo;
mod bot_repo;
mod deal_repo;
mod sync_status_repo;

pub use balance_repo::BalanceRepository;
pub use bot_repo::BotRepository;
pub use deal_repo::DealRepository;
pub use sync_status_repo::SyncStatusRepository;

use crate::database::Database;

/// Bundle of all repositories over one database.
#[derive(Debug, Clone)]
pub struct Repositories {
    pub deals: DealRepository,
    pub bots: BotRepository,
    pub balances: BalanceRepository,
    pub sync_status: SyncStatusRepository,
}

impl Repositories {
    /// Creates repositories sharing the database's pool.
    #[must_use]
    pub fn new(db: &Database) -> Self {
        Self {
            deals: DealRepository::new(db.pool().clone()),
            bots: BotRepository::new(db.pool().clone()),
            balances: BalanceRepository::new(db.pool().clone()),
            sync_status: SyncStatusRepository::new(db.pool().clone()),
        }
    }
}
