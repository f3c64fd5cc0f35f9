use shared::ProtocolHealthSnapshot;

use super::{ApiClient, ApiError};

impl ApiClient {
    /// Protocol-wide health summary. Public endpoint.
    pub async fn protocol_health(&self) -> Result<ProtocolHealthSnapshot, ApiError> {
        let response = self.get("/protocol/health").send().await?;
        self.decode(response).await
    }
}
