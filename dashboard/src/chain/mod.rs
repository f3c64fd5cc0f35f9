//! Wallet and contract gateway.
//!
//! Everything the transaction workflow needs from the chain goes through the
//! [`ChainGateway`] capability so tests can substitute doubles. The real
//! implementation, [`EvmGateway`], wraps an alloy provider with an optional
//! local signer and the protocol's contract bindings.

pub mod contracts;

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;

use crate::config::Config;

/// Metadata handed to a wallet when it does not recognize the target network.
#[derive(Debug, Clone)]
pub struct NetworkProfile {
    pub chain_id: u64,
    pub name: String,
    pub rpc_url: String,
    pub native_symbol: String,
    pub native_decimals: u8,
    pub explorer_url: String,
}

impl NetworkProfile {
    pub fn from_config(config: &Config) -> Self {
        Self {
            chain_id: config.chain_id,
            name: config.network_name.clone(),
            rpc_url: config.rpc_url.clone(),
            native_symbol: config.native_currency_symbol.clone(),
            native_decimals: config.native_currency_decimals,
            explorer_url: config.block_explorer_url.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("no signer available")]
    NoSigner,

    #[error("invalid wallet key: {0}")]
    BadSigner(String),

    #[error("gas estimation failed: {0}")]
    Estimation(String),

    #[error("execution reverted: {0}")]
    Reverted(String),

    #[error("wrong network: wallet is on chain {actual}, expected {expected}")]
    WrongNetwork { expected: u64, actual: u64 },

    #[error("rpc error: {0}")]
    Rpc(String),
}

/// Chain capability consumed by the transaction workflow.
///
/// Read calls never cost gas. Every state-changing call submits and then
/// awaits inclusion before returning the transaction hash.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainGateway: Send + Sync {
    /// Address of the connected signing account, if any.
    fn account(&self) -> Option<Address>;

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, GatewayError>;

    async fn token_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, GatewayError>;

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash, GatewayError>;

    async fn deposit_collateral(
        &self,
        collateral: Address,
        amount: U256,
    ) -> Result<TxHash, GatewayError>;

    async fn withdraw_collateral(
        &self,
        collateral: Address,
        amount: U256,
    ) -> Result<TxHash, GatewayError>;

    async fn mint_tokens(&self, collateral: Address, amount: U256)
        -> Result<TxHash, GatewayError>;

    async fn burn_tokens(&self, collateral: Address, amount: U256)
        -> Result<TxHash, GatewayError>;

    async fn auto_mint(&self, collateral: Address) -> Result<TxHash, GatewayError>;
}

/// Alloy-backed gateway over the configured RPC endpoint.
pub struct EvmGateway {
    provider: DynProvider,
    account: Option<Address>,
    vault: Address,
}

impl EvmGateway {
    /// Connect to the RPC endpoint and make sure the wallet is on the
    /// expected network before anything else touches the chain.
    pub async fn connect(config: &Config) -> Result<Self, GatewayError> {
        let (provider, account) = match &config.wallet_private_key {
            Some(key) => {
                let signer = key
                    .parse::<PrivateKeySigner>()
                    .map_err(|e| GatewayError::BadSigner(e.to_string()))?;
                let account = signer.address();
                let provider = ProviderBuilder::new()
                    .wallet(EthereumWallet::from(signer))
                    .connect(&config.rpc_url)
                    .await
                    .map_err(|e| GatewayError::Rpc(e.to_string()))?
                    .erased();
                (provider, Some(account))
            }
            None => {
                let provider = ProviderBuilder::new()
                    .connect(&config.rpc_url)
                    .await
                    .map_err(|e| GatewayError::Rpc(e.to_string()))?
                    .erased();
                (provider, None)
            }
        };

        ensure_network(&provider, &NetworkProfile::from_config(config)).await?;

        tracing::info!(
            "chain gateway connected to {} (chain {})",
            config.rpc_url,
            config.chain_id
        );

        Ok(Self { provider, account, vault: config.vault_contract })
    }

    pub(crate) fn provider(&self) -> &DynProvider {
        &self.provider
    }

    pub(crate) fn vault_address(&self) -> Address {
        self.vault
    }

    /// State-changing calls need a wallet behind the provider.
    pub(crate) fn require_signer(&self) -> Result<(), GatewayError> {
        if self.account.is_none() {
            return Err(GatewayError::NoSigner);
        }
        Ok(())
    }
}

/// Check the provider's network and ask the wallet to switch when it is on
/// the wrong one; register the network first if the wallet does not know it.
pub async fn ensure_network(
    provider: &DynProvider,
    profile: &NetworkProfile,
) -> Result<(), GatewayError> {
    let actual = provider
        .get_chain_id()
        .await
        .map_err(|e| GatewayError::Rpc(e.to_string()))?;
    if actual == profile.chain_id {
        return Ok(());
    }

    tracing::info!(
        "wallet is on chain {}, requesting switch to {} ({})",
        actual,
        profile.chain_id,
        profile.name
    );

    let chain_hex = format!("0x{:x}", profile.chain_id);
    let switch = provider
        .raw_request::<_, serde_json::Value>(
            "wallet_switchEthereumChain".into(),
            [serde_json::json!({ "chainId": chain_hex })],
        )
        .await;

    match switch {
        Ok(_) => {}
        Err(e) if is_unrecognized_chain(&e.to_string()) => {
            tracing::info!("wallet does not know chain {}, registering it", profile.chain_id);
            provider
                .raw_request::<_, serde_json::Value>(
                    "wallet_addEthereumChain".into(),
                    [serde_json::json!({
                        "chainId": chain_hex,
                        "chainName": profile.name,
                        "rpcUrls": [profile.rpc_url],
                        "nativeCurrency": {
                            "name": profile.native_symbol,
                            "symbol": profile.native_symbol,
                            "decimals": profile.native_decimals,
                        },
                        "blockExplorerUrls": [profile.explorer_url],
                    })],
                )
                .await
                .map_err(|e| GatewayError::Rpc(e.to_string()))?;
        }
        Err(e) => return Err(GatewayError::Rpc(e.to_string())),
    }

    let now = provider
        .get_chain_id()
        .await
        .map_err(|e| GatewayError::Rpc(e.to_string()))?;
    if now != profile.chain_id {
        return Err(GatewayError::WrongNetwork { expected: profile.chain_id, actual: now });
    }
    Ok(())
}

// EIP-1193 wallets signal an unknown chain with code 4902.
fn is_unrecognized_chain(message: &str) -> bool {
    message.contains("4902") || message.to_ascii_lowercase().contains("unrecognized chain")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_unrecognized_chain_signals() {
        assert!(is_unrecognized_chain("error code 4902: chain not added"));
        assert!(is_unrecognized_chain("Unrecognized chain ID \"0x539\""));
        assert!(!is_unrecognized_chain("user rejected the request"));
    }
}
