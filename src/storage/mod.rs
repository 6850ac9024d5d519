//! Stockview Record Store
//!
//! This module provides access to stored price records:
//!
//! - **types**: Core data structures (PriceRecord, PriceField, ProjectedRecord)
//! - **filter**: Store-facing predicates and projections
//! - **store**: The `RecordStore` trait the query layer depends on
//! - **memory**: In-memory store (tests, small datasets)
//! - **sqlite**: SQLite-backed store (default)
//! - **error**: Error types
//!
//! # Architecture
//!
//! ```text
//! Read Path:
//!   RecordFilter + Projection → RecordStore::find → ProjectedRecord[]
//!
//! Load Path:
//!   CSV → PriceRecord::validate → RecordStore::insert_many
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use stockview::storage::{PriceField, Projection, RecordFilter, RecordStore, SortOrder, SqliteStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = SqliteStore::open("./stockview_data/prices.db")?;
//!
//!     let filter = RecordFilter::new().company("AAPL");
//!     let rows = store
//!         .find(&filter, Projection::new(PriceField::Close), Some(SortOrder::Ascending))
//!         .await?;
//!
//!     println!("{} AAPL closes", rows.len());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod filter;
pub mod memory;
pub mod sqlite;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use error::{StorageError, StorageResult};
pub use filter::{DateBounds, Projection, RecordFilter};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use store::RecordStore;
pub use types::{day_part, PriceField, PriceRecord, ProjectedRecord, SortOrder, TextKey, UnknownField};
