//! Record store trait
//!
//! The query service only talks to storage through this trait, so the backing store is
//! injected at construction rather than held as a process-wide connection.

use async_trait::async_trait;

use crate::storage::error::StorageResult;
use crate::storage::filter::{Projection, RecordFilter};
use crate::storage::types::{PriceRecord, ProjectedRecord, SortOrder, TextKey};

/// Read (and bulk-load) access to stored price records
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Short backend name for logs and health output
    fn name(&self) -> &'static str;

    /// Distinct values of a text attribute, sorted ascending, no duplicates
    async fn find_distinct(&self, key: TextKey) -> StorageResult<Vec<String>>;

    /// Records matching `filter`, reduced to `projection`, optionally sorted by date
    async fn find(
        &self,
        filter: &RecordFilter,
        projection: Projection,
        sort: Option<SortOrder>,
    ) -> StorageResult<Vec<ProjectedRecord>>;

    /// The first record in the given date order, if the store is not empty
    async fn find_one(&self, sort: SortOrder) -> StorageResult<Option<PriceRecord>>;

    /// Append records; every record is validated first and the batch is all-or-nothing
    async fn insert_many(&self, records: Vec<PriceRecord>) -> StorageResult<usize>;

    /// Total number of stored records
    async fn count(&self) -> StorageResult<usize>;
}
