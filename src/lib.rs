//! # Stockview
//!
//! Stock price analytics API - filtered time series and summary statistics over a
//! historical daily price dataset.
//!
//! ## Features
//!
//! - **Field series**: one price field per company and date window, ascending by date
//! - **Summary statistics**: mean, min, max and population standard deviation
//! - **Pluggable store**: SQLite on disk or in memory, behind one trait
//! - **CSV import**: load a daily OHLCV export into the store
//! - **Comparison**: query up to five companies side by side from the CLI
//!
//! ## Modules
//!
//! - [`storage`]: Price records and the record store
//! - [`query`]: Parameter validation, query building and the query service
//! - [`api`]: REST API server with Axum
//! - [`client`]: HTTP client for the REST API
//! - [`import`]: CSV loader
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stockview::query::{FilterParams, QueryService};
//! use stockview::storage::SqliteStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(SqliteStore::open("./stockview_data/prices.db")?);
//!     let service = QueryService::new(store);
//!
//!     let params = FilterParams::for_field("Close")
//!         .company("AAPL")
//!         .start_date("2020-01-01")
//!         .end_date("2020-12-31");
//!
//!     let metrics = service.get_metrics(&params).await?;
//!     println!("AAPL close: avg {} over {} days", metrics.stats.avg, metrics.count);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod import;
pub mod logging;
pub mod query;
pub mod storage;

// Re-export top-level types for convenience
pub use storage::{
    MemoryStore, PriceField, PriceRecord, RecordStore, SqliteStore, StorageError, StorageResult,
};

pub use query::{
    DateRange, FieldMetrics, FilterParams, QueryError, QueryResult, QueryService, SeriesPoint,
    StatSummary,
};

pub use api::{build_router, serve, ApiError, AppState};

pub use client::{ApiClient, ClientError, SeriesRequest};

pub use config::{ApiConfig, Config, StoreBackend};

pub use import::{CsvImporter, ImportError, ImportSummary};
