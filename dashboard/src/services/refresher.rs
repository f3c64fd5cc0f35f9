use std::sync::Arc;

use alloy::primitives::Address;
use async_trait::async_trait;
use shared::{DashboardSnapshot, HistoryQuery};

use crate::api::{ApiClient, ApiError};
use crate::cache::SnapshotCache;

/// Capability consumed by the transaction workflow: re-fetch every read-only
/// snapshot after a confirmed action.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotRefresher: Send + Sync {
    async fn refresh(&self, collateral: Address);
}

pub struct Refresher {
    api: Arc<ApiClient>,
    cache: SnapshotCache,
    history_page_size: i64,
}

impl Refresher {
    pub fn new(api: Arc<ApiClient>, cache: SnapshotCache, history_page_size: i64) -> Self {
        Self { api, cache, history_page_size }
    }

    /// Fetch one consistent batch of snapshots for a collateral.
    ///
    /// The five reads are independent and issued in parallel; any failure
    /// fails the whole batch so the views never mix fresh and stale data.
    pub async fn fetch_batch(&self, collateral: Address) -> Result<DashboardSnapshot, ApiError> {
        let history =
            HistoryQuery { page: 1, limit: self.history_page_size, tx_type: None };

        let (position, mint_status, oracle, transactions, health) = tokio::try_join!(
            self.api.vault_position(collateral),
            self.api.mint_status(),
            self.api.oracle_price(collateral),
            self.api.transaction_history(&history),
            self.api.protocol_health(),
        )?;

        Ok(DashboardSnapshot { position, mint_status, oracle, transactions, health })
    }

    /// Cached batch for a collateral, fetching on a miss.
    pub async fn load(&self, collateral: Address) -> Result<DashboardSnapshot, ApiError> {
        if let Some(snapshot) = self.cache.get_snapshot(collateral).await {
            tracing::debug!("cache HIT for snapshot batch {}", collateral);
            return Ok(snapshot);
        }
        tracing::debug!("cache MISS for snapshot batch {}", collateral);

        let snapshot = self.fetch_batch(collateral).await?;
        self.cache.set_snapshot(collateral, snapshot.clone()).await;
        Ok(snapshot)
    }
}

#[async_trait]
impl SnapshotRefresher for Refresher {
    async fn refresh(&self, collateral: Address) {
        // Drop the stale batch first so views refetch even if this refresh fails.
        self.cache.invalidate_snapshot(collateral).await;

        match self.fetch_batch(collateral).await {
            Ok(snapshot) => {
                self.cache.set_snapshot(collateral, snapshot).await;
                tracing::info!("snapshots refreshed for {}", collateral);
            }
            Err(e) => {
                tracing::warn!("snapshot refresh failed for {}: {}", collateral, e);
            }
        }
    }
}
