//! Shared handler state

use crate::config::ServerConfig;
use srb_model::RiskPolicy;
use srb_store::{InMemoryRecordStore, RecordStore, StoreResult};
use std::sync::Arc;
use std::time::Instant;

/// State cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub policy: RiskPolicy,
    pub page_size: usize,
    pub max_page_size: usize,
    started: Instant,
}

impl AppState {
    /// Create new state over a store
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, config: &ServerConfig) -> Self {
        Self {
            store,
            policy: config.policy,
            page_size: config.page_size,
            max_page_size: config.max_page_size,
            started: Instant::now(),
        }
    }

    /// Open the store the configuration asks for
    ///
    /// # Errors
    /// Returns an error when the snapshot file exists but cannot be loaded.
    pub async fn from_config(config: &ServerConfig) -> StoreResult<Self> {
        let store: Arc<dyn RecordStore> = match &config.snapshot_path {
            Some(path) => Arc::new(InMemoryRecordStore::open(path, config.policy).await?),
            None => {
                tracing::warn!("no snapshot_path configured; records are kept in memory only");
                Arc::new(InMemoryRecordStore::with_policy(config.policy))
            }
        };
        Ok(Self::new(store, config))
    }

    #[must_use]
    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}
