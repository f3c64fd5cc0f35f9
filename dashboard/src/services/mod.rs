pub mod classifier;
pub mod preflight;
pub mod refresher;
pub mod workflow;

use std::sync::Arc;

pub use classifier::*;
pub use preflight::*;
pub use refresher::*;
pub use workflow::*;

use crate::{api::ApiClient, cache::SnapshotCache, config::Config};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub api: Arc<ApiClient>,
    pub cache: SnapshotCache,
}
