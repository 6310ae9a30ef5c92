use clap::{Parser, Subcommand, ValueEnum};

mod commands;

use botsync_engine::SyncMode;

#[derive(Parser)]
#[command(name = "botsync")]
#[command(about = "Synchronizes 3Commas bot activity into a local store", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one sync cycle: deals, bots, and account balances
    Sync {
        /// Profile TOML path
        #[arg(short, long)]
        profile: String,
        /// Sync strategy
        #[arg(long, value_enum, default_value_t = CliSyncMode::Auto)]
        mode: CliSyncMode,
        /// Page size for incremental deal fetches
        #[arg(long)]
        per_page: Option<u32>,
        /// SQLite database URL
        #[arg(long, default_value = "sqlite://botsync.db?mode=rwc")]
        database_url: String,
    },
    /// Run sync cycles on an interval until interrupted
    Watch {
        /// Profile TOML path
        #[arg(short, long)]
        profile: String,
        /// Seconds between cycles
        #[arg(long, default_value_t = 300)]
        interval_secs: u64,
        /// Page size for incremental deal fetches
        #[arg(long)]
        per_page: Option<u32>,
        /// SQLite database URL
        #[arg(long, default_value = "sqlite://botsync.db?mode=rwc")]
        database_url: String,
    },
    /// List exchange accounts visible to the profile's API key
    Accounts {
        /// Profile TOML path
        #[arg(short, long)]
        profile: String,
    },
    /// List the orders of one deal
    Orders {
        /// Profile TOML path
        #[arg(short, long)]
        profile: String,
        /// Remote deal id
        #[arg(long)]
        deal_id: i64,
    },
    /// List bots from the local store
    Bots {
        /// SQLite database URL
        #[arg(long, default_value = "sqlite://botsync.db?mode=rwc")]
        database_url: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliSyncMode {
    Auto,
    Full,
}

impl From<CliSyncMode> for SyncMode {
    fn from(mode: CliSyncMode) -> Self {
        match mode {
            CliSyncMode::Auto => Self::Auto,
            CliSyncMode::Full => Self::Full,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sync {
            profile,
            mode,
            per_page,
            database_url,
        } => commands::sync::run(&profile, mode.into(), per_page, &database_url).await,
        Commands::Watch {
            profile,
            interval_secs,
            per_page,
            database_url,
        } => commands::watch::run(&profile, interval_secs, per_page, &database_url).await,
        Commands::Accounts { profile } => commands::accounts::run(&profile).await,
        Commands::Orders { profile, deal_id } => commands::orders::run(&profile, deal_id).await,
        Commands::Bots { database_url } => commands::bots::run(&database_url).await,
    }
}
