use clap::{Parser, Subcommand};
use tracing::Level;

use shared::ActionKind;

/// Terminal dashboard for the vault stablecoin protocol
#[derive(Parser)]
#[command(name = "dashboard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Logging level
    #[arg(short, long, default_value = "info")]
    pub log_level: Level,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Protocol health and the enabled collateral list
    Overview,
    /// Vault position for one collateral (symbol or address)
    Position { collateral: String },
    /// Paginated transaction history
    History {
        #[arg(long, default_value_t = 1)]
        page: i64,
        #[arg(long)]
        limit: Option<i64>,
        /// Filter by action kind (deposit, withdraw, mint, repay, auto-mint)
        #[arg(long)]
        tx_type: Option<ActionKind>,
    },
    /// Auto-mint requests awaiting processing (admin)
    PendingMints,
    /// Deposit collateral into the vault
    Deposit { collateral: String, amount: String },
    /// Withdraw free collateral from the vault
    Withdraw { collateral: String, amount: String },
    /// Mint stablecoins against deposited collateral
    Mint { collateral: String, amount: String },
    /// Repay (burn) minted stablecoins
    Repay { collateral: String, amount: String },
    /// Request a protocol-validated bonus mint
    AutoMint { collateral: String },
}
