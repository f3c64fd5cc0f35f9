//! # Vault Dashboard Client
//!
//! Terminal client for a collateralized-debt-position stablecoin protocol.
//! It reads protocol state from the backend REST API and submits protocol
//! actions (deposit, withdraw, mint, repay, auto-mint) against the vault
//! contract through an EVM wallet.
//!
//! ## Architecture
//!
//! 1. **Configuration**: environment variables, loaded once at startup
//! 2. **Session**: bearer credential from a prior login, passed explicitly
//! 3. **API client**: typed REST reads with schema validation at the boundary
//! 4. **Cache**: snapshot batches with TTL
//! 5. **Chain gateway**: alloy provider, network check, contract bindings
//! 6. **Transaction workflow**: approve-then-act sequencing with pre-flight
//!    checks, failure classification and a snapshot refresh on confirmation
//!
//! ## Commands
//!
//! - `overview` - protocol health and enabled collaterals
//! - `position <collateral>` - vault position dashboard
//! - `history` - paginated transaction history
//! - `pending-mints` - auto-mint requests awaiting processing
//! - `deposit|withdraw|mint|repay <collateral> <amount>`, `auto-mint <collateral>`

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use anyhow::Context;
use clap::Parser;
use futures_util::future::join_all;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod cache;
mod chain;
mod cli;
mod config;
mod services;
mod session;
mod views;
#[cfg(test)]
mod workflow_tests;

use api::ApiClient;
use cache::SnapshotCache;
use chain::EvmGateway;
use cli::{Cli, Commands};
use config::Config;
use services::{AppState, Refresher, TxWorkflow};
use session::Session;
use shared::{ActionKind, ActionRequest, CollateralInfo, HistoryQuery};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    // Initialize tracing with default level filters
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("dashboard={}", args.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::debug!("configuration loaded");

    let session = config.access_token.clone().map(Session::new);
    let api = Arc::new(ApiClient::new(&config, session).context("Failed to build API client")?);
    let cache = SnapshotCache::new(1_000, Duration::from_secs(config.cache_ttl_seconds));
    let state = AppState { config, api, cache };

    match args.command {
        Commands::Overview => run_overview(&state).await,
        Commands::Position { collateral } => run_position(&state, &collateral).await,
        Commands::History { page, limit, tx_type } => {
            run_history(&state, page, limit, tx_type).await
        }
        Commands::PendingMints => run_pending_mints(&state).await,
        Commands::Deposit { collateral, amount } => {
            run_action(&state, ActionKind::Deposit, &collateral, Some(amount)).await
        }
        Commands::Withdraw { collateral, amount } => {
            run_action(&state, ActionKind::Withdraw, &collateral, Some(amount)).await
        }
        Commands::Mint { collateral, amount } => {
            run_action(&state, ActionKind::Mint, &collateral, Some(amount)).await
        }
        Commands::Repay { collateral, amount } => {
            run_action(&state, ActionKind::Repay, &collateral, Some(amount)).await
        }
        Commands::AutoMint { collateral } => {
            run_action(&state, ActionKind::AutoMint, &collateral, None).await
        }
    }
}

async fn run_overview(state: &AppState) -> anyhow::Result<()> {
    let (health, collaterals) =
        tokio::try_join!(state.api.protocol_health(), load_collaterals(state))?;

    // Oracle prices are independent reads; fetch them all at once. The
    // overview stays useful even when a price is unavailable.
    let prices =
        join_all(collaterals.iter().map(|c| state.api.oracle_price(c.address))).await;

    let rows: Vec<_> = collaterals
        .into_iter()
        .zip(prices)
        .map(|(collateral, oracle)| (collateral, oracle.ok().map(|o| o.price_usd)))
        .collect();

    views::render_overview(&health, &rows);
    Ok(())
}

async fn run_position(state: &AppState, collateral: &str) -> anyhow::Result<()> {
    let info = resolve_collateral(state, collateral).await?;
    let refresher = Refresher::new(
        state.api.clone(),
        state.cache.clone(),
        state.config.history_page_size,
    );
    let snapshot = refresher.load(info.address).await?;
    views::render_position(&info, &snapshot);
    Ok(())
}

async fn run_history(
    state: &AppState,
    page: i64,
    limit: Option<i64>,
    tx_type: Option<ActionKind>,
) -> anyhow::Result<()> {
    let query = HistoryQuery {
        page,
        limit: limit.unwrap_or(state.config.history_page_size),
        tx_type,
    };
    let history = state.api.transaction_history(&query).await?;
    views::render_history(&history);
    Ok(())
}

async fn run_pending_mints(state: &AppState) -> anyhow::Result<()> {
    let pending = state.api.pending_mint_requests().await?;
    views::render_pending_mints(&pending);
    Ok(())
}

async fn run_action(
    state: &AppState,
    kind: ActionKind,
    collateral: &str,
    amount: Option<String>,
) -> anyhow::Result<()> {
    let collateral = resolve_collateral(state, collateral).await?;
    let gateway = Arc::new(EvmGateway::connect(&state.config).await?);
    let refresher = Arc::new(Refresher::new(
        state.api.clone(),
        state.cache.clone(),
        state.config.history_page_size,
    ));
    let workflow = Arc::new(TxWorkflow::new(
        gateway,
        state.api.clone(),
        refresher,
        state.config.vault_contract,
        state.config.stablecoin_address,
    ));

    let mut status_rx = workflow.subscribe();
    let printer = tokio::spawn(async move {
        while status_rx.changed().await.is_ok() {
            let status = status_rx.borrow_and_update().clone();
            println!("  [{}] {}", status.phase, status.message);
            if status.phase.is_terminal() {
                break;
            }
        }
    });

    let request = ActionRequest { kind, collateral, amount };
    let result = workflow.submit(request).await;

    // Dropping the workflow closes the status channel and ends the printer.
    drop(workflow);
    let _ = printer.await;

    match result {
        Ok(tx_hash) => {
            println!("Transaction confirmed: {}", tx_hash);
            Ok(())
        }
        Err(e) => Err(anyhow::Error::new(e)),
    }
}

/// Accept a collateral symbol or a literal address.
async fn resolve_collateral(state: &AppState, input: &str) -> anyhow::Result<CollateralInfo> {
    let collaterals = load_collaterals(state).await?;

    if let Ok(address) = Address::from_str(input) {
        return collaterals
            .into_iter()
            .find(|c| c.address == address)
            .with_context(|| format!("collateral {} is not enabled", address));
    }

    collaterals
        .into_iter()
        .find(|c| c.symbol.eq_ignore_ascii_case(input))
        .with_context(|| format!("unknown collateral: {}", input))
}

async fn load_collaterals(state: &AppState) -> Result<Vec<CollateralInfo>, api::ApiError> {
    if let Some(collaterals) = state.cache.get_collaterals().await {
        return Ok(collaterals);
    }
    let collaterals = state.api.enabled_collaterals().await?;
    state.cache.set_collaterals(collaterals.clone()).await;
    Ok(collaterals)
}
