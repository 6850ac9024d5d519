//! In-memory record store
//!
//! Holds records in a `Vec` behind Tokio's async `RwLock`. Readers never block each
//! other; inserts take the write lock briefly.

use async_trait::async_trait;
use std::collections::BTreeSet;
use tokio::sync::RwLock;

use crate::storage::error::StorageResult;
use crate::storage::filter::{Projection, RecordFilter};
use crate::storage::store::RecordStore;
use crate::storage::types::{PriceRecord, ProjectedRecord, SortOrder, TextKey};

/// Record store backed by process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<PriceRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-loaded with records (validated)
    pub fn with_records(records: Vec<PriceRecord>) -> StorageResult<Self> {
        for record in &records {
            record.validate()?;
        }
        Ok(Self {
            records: RwLock::new(records),
        })
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn find_distinct(&self, key: TextKey) -> StorageResult<Vec<String>> {
        let records = self.records.read().await;
        let values: BTreeSet<&str> = records.iter().map(|r| key.value(r)).collect();
        Ok(values.into_iter().map(str::to_string).collect())
    }

    async fn find(
        &self,
        filter: &RecordFilter,
        projection: Projection,
        sort: Option<SortOrder>,
    ) -> StorageResult<Vec<ProjectedRecord>> {
        let records = self.records.read().await;
        let mut matched: Vec<ProjectedRecord> = records
            .iter()
            .filter(|r| filter.matches(r))
            .map(|r| projection.apply(r))
            .collect();

        match sort {
            Some(SortOrder::Ascending) => matched.sort_by(|a, b| a.date.cmp(&b.date)),
            Some(SortOrder::Descending) => matched.sort_by(|a, b| b.date.cmp(&a.date)),
            None => {}
        }

        Ok(matched)
    }

    async fn find_one(&self, sort: SortOrder) -> StorageResult<Option<PriceRecord>> {
        let records = self.records.read().await;
        let found = match sort {
            SortOrder::Ascending => records.iter().min_by(|a, b| a.date.cmp(&b.date)),
            SortOrder::Descending => records.iter().max_by(|a, b| a.date.cmp(&b.date)),
        };
        Ok(found.cloned())
    }

    async fn insert_many(&self, records: Vec<PriceRecord>) -> StorageResult<usize> {
        for record in &records {
            record.validate()?;
        }
        let count = records.len();
        self.records.write().await.extend(records);
        Ok(count)
    }

    async fn count(&self) -> StorageResult<usize> {
        Ok(self.records.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::filter::DateBounds;
    use crate::storage::types::PriceField;

    fn record(date: &str, company: &str, close: f64) -> PriceRecord {
        PriceRecord::new(date, company, close, close, close, close, 1000.0)
    }

    fn create_test_store() -> MemoryStore {
        MemoryStore::with_records(vec![
            record("2020-01-03", "MSFT", 3.0),
            record("2020-01-01", "AAPL", 1.0),
            record("2020-01-02", "AAPL", 2.0),
            record("2020-01-01", "MSFT", 10.0),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_find_distinct_sorted_unique() {
        let store = create_test_store();
        let companies = store.find_distinct(TextKey::Company).await.unwrap();
        assert_eq!(companies, vec!["AAPL", "MSFT"]);
    }

    #[tokio::test]
    async fn test_find_sorted_with_projection() {
        let store = create_test_store();
        let rows = store
            .find(
                &RecordFilter::new(),
                Projection::new(PriceField::Close),
                Some(SortOrder::Ascending),
            )
            .await
            .unwrap();

        assert_eq!(rows.len(), 4);
        assert!(rows.windows(2).all(|w| w[0].date <= w[1].date));
        assert_eq!(rows.last().unwrap().value, 3.0);
    }

    #[tokio::test]
    async fn test_find_filtered() {
        let store = create_test_store();
        let filter = RecordFilter::new().company("AAPL").dates(DateBounds {
            from: Some("2020-01-02".to_string()),
            to: None,
        });
        let rows = store
            .find(&filter, Projection::new(PriceField::Close), None)
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, 2.0);
    }

    #[tokio::test]
    async fn test_find_one() {
        let store = create_test_store();
        let first = store.find_one(SortOrder::Ascending).await.unwrap().unwrap();
        let last = store.find_one(SortOrder::Descending).await.unwrap().unwrap();
        assert_eq!(first.date, "2020-01-01");
        assert_eq!(last.date, "2020-01-03");

        let empty = MemoryStore::new();
        assert!(empty.find_one(SortOrder::Ascending).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_many_rejects_invalid_batch() {
        let store = MemoryStore::new();
        let batch = vec![record("2020-01-01", "AAPL", 1.0), record("bad", "AAPL", 1.0)];

        assert!(store.insert_many(batch).await.is_err());
        assert_eq!(store.count().await.unwrap(), 0);

        let inserted = store
            .insert_many(vec![record("2020-01-01", "AAPL", 1.0)])
            .await
            .unwrap();
        assert_eq!(inserted, 1);
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
