use std::sync::Arc;

use crate::config::{Config, CorruptRecordPolicy};
use crate::db::KeyValueBackend;
use crate::services::RecommendationStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: RecommendationStore,
}

impl AppState {
    /// Builds state around an already connected backend handle
    pub fn new(backend: Arc<dyn KeyValueBackend>, config: &Config) -> Self {
        Self {
            store: RecommendationStore::new(
                backend,
                config.max_write_attempts,
                config.corrupt_record_policy,
            ),
        }
    }

    /// State with default write and listing policies
    pub fn with_backend(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self {
            store: RecommendationStore::new(backend, 5, CorruptRecordPolicy::default()),
        }
    }
}
