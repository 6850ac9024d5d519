//! Stockview API Server
//!
//! Run with: cargo run --bin stockview-api
//!
//! # Configuration
//!
//! Read from `config.toml` (see `stockview config`), then overridden by:
//! - `STOCKVIEW_BACKEND`: Record store, `sqlite` or `memory` (default: sqlite)
//! - `STOCKVIEW_DB_PATH`: SQLite database file
//! - `STOCKVIEW_SEED_CSV`: CSV file loaded into the store at startup
//! - `STOCKVIEW_API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `STOCKVIEW_API_PORT`: Port to listen on (default: 3000)
//! - `STOCKVIEW_LOG_LEVEL` / `STOCKVIEW_LOG_FORMAT`: Logging (`RUST_LOG` wins)

use std::path::Path;
use std::sync::Arc;

use stockview::api::{serve, AppState};
use stockview::config::{Config, StoreBackend, StoreConfig};
use stockview::import::CsvImporter;
use stockview::logging;
use stockview::storage::{MemoryStore, RecordStore, SqliteStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::load_default();
    logging::init(&config.logging)?;

    tracing::info!("Starting Stockview API server v{}", env!("CARGO_PKG_VERSION"));

    let store = open_store(&config.store)?;

    if let Some(seed) = &config.store.seed_csv {
        tracing::info!("Seeding store from {}", seed);
        let summary = CsvImporter::new()
            .import_into(store.as_ref(), Path::new(seed))
            .await?;
        tracing::info!(
            inserted = summary.inserted,
            rows_failed = summary.rows_failed,
            "Seed complete"
        );
    }

    match store.count().await {
        Ok(count) => tracing::info!(store = store.name(), records = count, "Record store ready"),
        Err(e) => tracing::warn!("Record store not answering: {}", e),
    }

    let state = AppState::from_store(store, config.api.clone());

    tracing::info!("Starting server on {}", config.api.addr());
    serve(state, &config.api).await?;

    tracing::info!("Stockview API server stopped");
    Ok(())
}

/// Open the configured record store
fn open_store(
    config: &StoreConfig,
) -> Result<Arc<dyn RecordStore>, Box<dyn std::error::Error + Send + Sync>> {
    let store: Arc<dyn RecordStore> = match config.backend {
        StoreBackend::Sqlite => {
            tracing::info!("Opening SQLite store at {}", config.path);
            Arc::new(SqliteStore::open(&config.path)?)
        }
        StoreBackend::Memory => {
            tracing::info!("Using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };
    Ok(store)
}
