//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::config::ApiConfig;
use crate::query::QueryService;
use crate::storage::RecordStore;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Query service answering series, metrics, companies and date range
    pub service: Arc<QueryService>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create state around an already-built query service
    pub fn new(service: Arc<QueryService>, config: ApiConfig) -> Self {
        Self {
            service,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Create state directly from a record store
    pub fn from_store(store: Arc<dyn RecordStore>, config: ApiConfig) -> Self {
        Self::new(Arc::new(QueryService::new(store)), config)
    }

    /// The record store behind the query service
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        self.service.store()
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
