pub mod config;
pub mod config_loader;
pub mod formulas;
pub mod validation;

pub use config::{ApiConfig, ApiMode, Profile, ReservedFund, SyncSettings};
pub use config_loader::ProfileLoader;
pub use validation::{validate_profile_filters, FilterError};
