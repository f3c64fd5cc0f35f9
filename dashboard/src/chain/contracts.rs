//! Contract bindings and the alloy-backed [`ChainGateway`] implementation.

use alloy::primitives::{Address, TxHash, U256};
use alloy::sol;
use async_trait::async_trait;

use super::{ChainGateway, EvmGateway, GatewayError};

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address owner) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 value) external returns (bool);
        function decimals() external view returns (uint8);
    }

    #[sol(rpc)]
    interface IStablecoinVault {
        function depositCollateral(address collateral, uint256 amount) external;
        function withdrawCollateral(address collateral, uint256 amount) external;
        function mintTokens(address collateral, uint256 amount) external;
        function burnTokens(address collateral, uint256 amount) external;
        function autoMint(address collateral) external;
    }
}

#[async_trait]
impl ChainGateway for EvmGateway {
    fn account(&self) -> Option<Address> {
        self.account
    }

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, GatewayError> {
        let erc20 = IERC20::new(token, self.provider().clone());
        erc20.balanceOf(owner).call().await.map_err(map_contract_error)
    }

    async fn token_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, GatewayError> {
        let erc20 = IERC20::new(token, self.provider().clone());
        erc20.allowance(owner, spender).call().await.map_err(map_contract_error)
    }

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash, GatewayError> {
        self.require_signer()?;
        let erc20 = IERC20::new(token, self.provider().clone());
        let pending = erc20.approve(spender, amount).send().await.map_err(map_contract_error)?;
        pending.watch().await.map_err(|e| GatewayError::Rpc(e.to_string()))
    }

    async fn deposit_collateral(
        &self,
        collateral: Address,
        amount: U256,
    ) -> Result<TxHash, GatewayError> {
        self.require_signer()?;
        let vault = IStablecoinVault::new(self.vault_address(), self.provider().clone());
        let pending = vault
            .depositCollateral(collateral, amount)
            .send()
            .await
            .map_err(map_contract_error)?;
        pending.watch().await.map_err(|e| GatewayError::Rpc(e.to_string()))
    }

    async fn withdraw_collateral(
        &self,
        collateral: Address,
        amount: U256,
    ) -> Result<TxHash, GatewayError> {
        self.require_signer()?;
        let vault = IStablecoinVault::new(self.vault_address(), self.provider().clone());
        let pending = vault
            .withdrawCollateral(collateral, amount)
            .send()
            .await
            .map_err(map_contract_error)?;
        pending.watch().await.map_err(|e| GatewayError::Rpc(e.to_string()))
    }

    async fn mint_tokens(
        &self,
        collateral: Address,
        amount: U256,
    ) -> Result<TxHash, GatewayError> {
        self.require_signer()?;
        let vault = IStablecoinVault::new(self.vault_address(), self.provider().clone());
        let pending =
            vault.mintTokens(collateral, amount).send().await.map_err(map_contract_error)?;
        pending.watch().await.map_err(|e| GatewayError::Rpc(e.to_string()))
    }

    async fn burn_tokens(
        &self,
        collateral: Address,
        amount: U256,
    ) -> Result<TxHash, GatewayError> {
        self.require_signer()?;
        let vault = IStablecoinVault::new(self.vault_address(), self.provider().clone());
        let pending =
            vault.burnTokens(collateral, amount).send().await.map_err(map_contract_error)?;
        pending.watch().await.map_err(|e| GatewayError::Rpc(e.to_string()))
    }

    async fn auto_mint(&self, collateral: Address) -> Result<TxHash, GatewayError> {
        self.require_signer()?;
        let vault = IStablecoinVault::new(self.vault_address(), self.provider().clone());
        let pending = vault.autoMint(collateral).send().await.map_err(map_contract_error)?;
        pending.watch().await.map_err(|e| GatewayError::Rpc(e.to_string()))
    }
}

/// Fold an alloy contract error into the gateway taxonomy.
///
/// Revert payloads keep their decoded reason string; everything the node
/// rejects during simulation counts as an estimation failure.
pub(crate) fn map_contract_error(err: alloy::contract::Error) -> GatewayError {
    if let Some(data) = err.as_revert_data() {
        if let Some(reason) = alloy::sol_types::decode_revert_reason(&data) {
            return GatewayError::Reverted(reason);
        }
        return GatewayError::Reverted(format!("0x{}", alloy::hex::encode(&data)));
    }

    let message = err.to_string();
    let lowered = message.to_ascii_lowercase();
    if lowered.contains("gas") || lowered.contains("execution reverted") {
        return GatewayError::Estimation(message);
    }
    GatewayError::Rpc(message)
}
