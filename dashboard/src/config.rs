//! # Configuration Module
//!
//! This module handles loading and validation of environment variables
//! for the vault dashboard client.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default | Required |
//! |----------|-------------|---------|----------|
//! | `API_BASE_URL` | Backend REST base URL | `http://localhost:3000/api/v1` | No |
//! | `ACCESS_TOKEN` | Bearer credential from a prior login | - | No |
//! | `RPC_URL` | EVM JSON-RPC endpoint | `http://localhost:8545` | No |
//! | `CHAIN_ID` | Expected network identifier | - | Yes |
//! | `VAULT_CONTRACT` | Vault contract address | - | Yes |
//! | `STABLECOIN_ADDRESS` | Stablecoin token address | - | Yes |
//! | `WALLET_PRIVATE_KEY` | Signing key; read-only without it | - | No |
//! | `NETWORK_NAME` | Display name used when registering the network | `Vault Protocol Network` | No |
//! | `NATIVE_CURRENCY_SYMBOL` | Native currency for network registration | `ETH` | No |
//! | `BLOCK_EXPLORER_URL` | Explorer used when registering the network | `https://etherscan.io` | No |
//! | `HTTP_TIMEOUT_SECONDS` | REST request timeout | `30` | No |
//! | `CACHE_TTL_SECONDS` | Snapshot cache TTL | `300` | No |
//! | `HISTORY_PAGE_SIZE` | Transactions fetched per history page | `20` | No |

use alloy::primitives::Address;
use std::str::FromStr;

/// Client configuration loaded from environment variables
///
/// This struct contains all configuration values needed to run the
/// dashboard. Use `Config::from_env()` to load from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the backend REST API
    pub api_base_url: String,
    /// Bearer credential obtained from a prior authentication step
    pub access_token: Option<String>,
    /// EVM JSON-RPC endpoint URL
    pub rpc_url: String,
    /// Network identifier the wallet must be on
    pub chain_id: u64,
    /// Address of the deployed vault contract
    pub vault_contract: Address,
    /// Address of the protocol stablecoin token
    pub stablecoin_address: Address,
    /// Signing key for submitting transactions; absent means read-only
    pub wallet_private_key: Option<String>,
    /// Display name used when registering the network with a wallet
    pub network_name: String,
    /// Native currency symbol used when registering the network
    pub native_currency_symbol: String,
    /// Native currency decimals used when registering the network
    pub native_currency_decimals: u8,
    /// Block explorer URL used when registering the network
    pub block_explorer_url: String,
    /// Timeout for backend REST requests in seconds
    pub http_timeout_seconds: u64,
    /// Time-to-live for cached snapshots in seconds
    pub cache_ttl_seconds: u64,
    /// Number of transactions fetched per history page
    pub history_page_size: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base_url = std::env::var("API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000/api/v1".to_string());

        let access_token = std::env::var("ACCESS_TOKEN").ok().filter(|t| !t.is_empty());

        let rpc_url =
            std::env::var("RPC_URL").unwrap_or_else(|_| "http://localhost:8545".to_string());

        let chain_id = std::env::var("CHAIN_ID")
            .map_err(|_| ConfigError::MissingEnvVar("CHAIN_ID"))?
            .parse()
            .map_err(|_| ConfigError::InvalidNumber("CHAIN_ID"))?;

        let vault_contract = parse_address("VAULT_CONTRACT")?;
        let stablecoin_address = parse_address("STABLECOIN_ADDRESS")?;

        let wallet_private_key =
            std::env::var("WALLET_PRIVATE_KEY").ok().filter(|k| !k.is_empty());

        let network_name = std::env::var("NETWORK_NAME")
            .unwrap_or_else(|_| "Vault Protocol Network".to_string());

        let native_currency_symbol =
            std::env::var("NATIVE_CURRENCY_SYMBOL").unwrap_or_else(|_| "ETH".to_string());

        let native_currency_decimals = std::env::var("NATIVE_CURRENCY_DECIMALS")
            .unwrap_or_else(|_| "18".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidNumber("NATIVE_CURRENCY_DECIMALS"))?;

        let block_explorer_url = std::env::var("BLOCK_EXPLORER_URL")
            .unwrap_or_else(|_| "https://etherscan.io".to_string());

        let http_timeout_seconds = std::env::var("HTTP_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidNumber("HTTP_TIMEOUT_SECONDS"))?;

        let cache_ttl_seconds = std::env::var("CACHE_TTL_SECONDS")
            .unwrap_or_else(|_| "300".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidNumber("CACHE_TTL_SECONDS"))?;

        let history_page_size = std::env::var("HISTORY_PAGE_SIZE")
            .unwrap_or_else(|_| "20".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidNumber("HISTORY_PAGE_SIZE"))?;

        Ok(Config {
            api_base_url,
            access_token,
            rpc_url,
            chain_id,
            vault_contract,
            stablecoin_address,
            wallet_private_key,
            network_name,
            native_currency_symbol,
            native_currency_decimals,
            block_explorer_url,
            http_timeout_seconds,
            cache_ttl_seconds,
            history_page_size,
        })
    }
}

fn parse_address(var: &'static str) -> Result<Address, ConfigError> {
    let raw = std::env::var(var).map_err(|_| ConfigError::MissingEnvVar(var))?;
    Address::from_str(raw.trim())
        .map_err(|e| ConfigError::InvalidAddress { var, detail: e.to_string() })
}

/// Configuration errors that can occur during loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is missing
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// An address variable does not hold a valid EVM address
    #[error("Invalid address in {var}: {detail}")]
    InvalidAddress { var: &'static str, detail: String },

    /// A numeric environment variable has an invalid value
    #[error("Invalid number for {0}")]
    InvalidNumber(&'static str),
}
