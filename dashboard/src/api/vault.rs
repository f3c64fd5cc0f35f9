use alloy::primitives::Address;
use shared::{CollateralInfo, PositionSnapshot};

use super::{ApiClient, ApiError};

impl ApiClient {
    /// Vault position for the authenticated account and one collateral.
    pub async fn vault_position(&self, collateral: Address) -> Result<PositionSnapshot, ApiError> {
        let response = self.get(&format!("/vault/position/{}", collateral)).send().await?;
        self.decode(response).await
    }

    /// Collateral tokens currently enabled by the protocol. Public endpoint.
    pub async fn enabled_collaterals(&self) -> Result<Vec<CollateralInfo>, ApiError> {
        let response = self.get("/vault/collaterals").send().await?;
        self.decode(response).await
    }
}
