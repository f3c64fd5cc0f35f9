use shared::{HistoryQuery, TransactionPage};

use super::{ApiClient, ApiError};

impl ApiClient {
    /// Paginated transaction history for the authenticated account.
    pub async fn transaction_history(
        &self,
        query: &HistoryQuery,
    ) -> Result<TransactionPage, ApiError> {
        let mut params = vec![
            format!("page={}", query.page),
            format!("limit={}", query.limit),
        ];
        if let Some(kind) = query.tx_type {
            params.push(format!("type={}", kind.as_str()));
        }

        let url = format!("/transaction/history?{}", params.join("&"));
        let response = self.get(&url).send().await?;
        self.decode(response).await
    }
}
