use std::time::Duration;

use alloy::primitives::Address;
use moka::future::Cache as MokaCache;
use shared::{CollateralInfo, DashboardSnapshot};

const COLLATERALS_KEY: &str = "collaterals";

#[derive(Clone)]
pub struct SnapshotCache {
    snapshots: MokaCache<Address, DashboardSnapshot>,
    collaterals: MokaCache<String, Vec<CollateralInfo>>,
}

impl SnapshotCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            snapshots: MokaCache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),

            collaterals: MokaCache::builder().max_capacity(1).time_to_live(ttl).build(),
        }
    }

    pub async fn get_snapshot(&self, collateral: Address) -> Option<DashboardSnapshot> {
        self.snapshots.get(&collateral).await
    }

    pub async fn set_snapshot(&self, collateral: Address, snapshot: DashboardSnapshot) {
        self.snapshots.insert(collateral, snapshot).await;
    }

    pub async fn invalidate_snapshot(&self, collateral: Address) {
        self.snapshots.invalidate(&collateral).await;
    }

    pub async fn get_collaterals(&self) -> Option<Vec<CollateralInfo>> {
        self.collaterals.get(COLLATERALS_KEY).await
    }

    pub async fn set_collaterals(&self, collaterals: Vec<CollateralInfo>) {
        self.collaterals.insert(COLLATERALS_KEY.to_string(), collaterals).await;
    }
}
