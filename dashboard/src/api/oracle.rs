use alloy::primitives::Address;
use shared::OracleSnapshot;

use super::{ApiClient, ApiError};

impl ApiClient {
    /// Latest oracle price for one collateral, with the backend's staleness flag.
    pub async fn oracle_price(&self, collateral: Address) -> Result<OracleSnapshot, ApiError> {
        let response = self.get(&format!("/oracle/price/{}", collateral)).send().await?;
        self.decode(response).await
    }
}
