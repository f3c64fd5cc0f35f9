use alloy::primitives::Address;
use async_trait::async_trait;
use serde_json::json;
use shared::{AutoMintVerdict, MintStatusSnapshot, PendingMintRequest};

use super::{ApiClient, ApiError};

/// Capability consumed by the transaction workflow: the backend decides
/// whether the account may auto-mint right now, and why not otherwise.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AutoMintValidator: Send + Sync {
    async fn validate_auto_mint(&self, collateral: Address) -> Result<AutoMintVerdict, ApiError>;
}

impl ApiClient {
    /// Mint status for the authenticated account.
    pub async fn mint_status(&self) -> Result<MintStatusSnapshot, ApiError> {
        let response = self.get("/mint/status").send().await?;
        self.decode(response).await
    }

    /// Auto-mint requests awaiting protocol processing. Admin view.
    pub async fn pending_mint_requests(&self) -> Result<Vec<PendingMintRequest>, ApiError> {
        let response = self.get("/mint/pending").send().await?;
        self.decode(response).await
    }
}

#[async_trait]
impl AutoMintValidator for ApiClient {
    async fn validate_auto_mint(&self, collateral: Address) -> Result<AutoMintVerdict, ApiError> {
        let response = self
            .post("/mint/auto-mint/validate")
            .json(&json!({ "collateral": collateral }))
            .send()
            .await?;
        self.decode(response).await
    }
}
