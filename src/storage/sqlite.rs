//! SQLite record store
//!
//! Stores price records in a single `prices` table indexed on `(date, company)`.
//! The connection lives behind a mutex and every call runs on Tokio's blocking pool,
//! so async request handlers never block on disk I/O.
//!
//! # Performance
//! - Range query: O(log n + k) through the `(date, company)` index
//! - Distinct companies: served from the `company` index

use async_trait::async_trait;
use rusqlite::{params, params_from_iter, Connection, OpenFlags, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::filter::{Projection, RecordFilter};
use crate::storage::store::RecordStore;
use crate::storage::types::{PriceRecord, ProjectedRecord, SortOrder, TextKey};

const RECORD_COLUMNS: &str =
    "date, open, high, low, close, volume, dividends, stock_splits, company";

/// SQLite-backed record store
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    path: PathBuf,
}

impl SqliteStore {
    /// Create or open a store at `path`
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA cache_size = 10000;
            PRAGMA temp_store = MEMORY;
            ",
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS prices (
                date TEXT NOT NULL,
                open REAL NOT NULL,
                high REAL NOT NULL,
                low REAL NOT NULL,
                close REAL NOT NULL,
                volume REAL NOT NULL,
                dividends REAL NOT NULL DEFAULT 0,
                stock_splits REAL NOT NULL DEFAULT 0,
                company TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_date_company ON prices(date, company)",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_company ON prices(company)",
            [],
        )?;

        tracing::debug!(path = ?path, "Opened SQLite record store");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        })
    }

    /// Path of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` against the connection on the blocking pool
    async fn with_conn<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&mut Connection) -> StorageResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|e| StorageError::Lock(format!("SQLite connection poisoned: {}", e)))?;
            f(&mut guard)
        })
        .await?
    }
}

fn read_record(row: &Row<'_>) -> rusqlite::Result<PriceRecord> {
    Ok(PriceRecord {
        date: row.get(0)?,
        open: row.get(1)?,
        high: row.get(2)?,
        low: row.get(3)?,
        close: row.get(4)?,
        volume: row.get(5)?,
        dividends: row.get(6)?,
        stock_splits: row.get(7)?,
        company: row.get(8)?,
    })
}

#[async_trait]
impl RecordStore for SqliteStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn find_distinct(&self, key: TextKey) -> StorageResult<Vec<String>> {
        let sql = format!(
            "SELECT DISTINCT {col} FROM prices ORDER BY {col}",
            col = key.column()
        );

        self.with_conn(move |conn| {
            let mut stmt = conn.prepare_cached(&sql)?;
            let values = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(values)
        })
        .await
    }

    async fn find(
        &self,
        filter: &RecordFilter,
        projection: Projection,
        sort: Option<SortOrder>,
    ) -> StorageResult<Vec<ProjectedRecord>> {
        let (where_clause, params) = filter.to_sql();
        let order_clause = sort
            .map(|s| format!(" ORDER BY date {}", s.sql()))
            .unwrap_or_default();
        let sql = format!(
            "SELECT {} FROM prices{}{}",
            projection.columns(),
            where_clause,
            order_clause
        );

        self.with_conn(move |conn| {
            let mut stmt = conn.prepare_cached(&sql)?;
            let rows = stmt
                .query_map(params_from_iter(params.iter()), |row| {
                    Ok(ProjectedRecord {
                        date: row.get(0)?,
                        company: row.get(1)?,
                        value: row.get(2)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
    }

    async fn find_one(&self, sort: SortOrder) -> StorageResult<Option<PriceRecord>> {
        let sql = format!(
            "SELECT {} FROM prices ORDER BY date {} LIMIT 1",
            RECORD_COLUMNS,
            sort.sql()
        );

        self.with_conn(move |conn| {
            let record = conn.query_row(&sql, [], read_record).optional()?;
            Ok(record)
        })
        .await
    }

    async fn insert_many(&self, records: Vec<PriceRecord>) -> StorageResult<usize> {
        for record in &records {
            record.validate()?;
        }

        if records.is_empty() {
            return Ok(0);
        }

        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare_cached(&format!(
                    "INSERT INTO prices ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                    RECORD_COLUMNS
                ))?;

                for r in &records {
                    stmt.execute(params![
                        r.date,
                        r.open,
                        r.high,
                        r.low,
                        r.close,
                        r.volume,
                        r.dividends,
                        r.stock_splits,
                        r.company
                    ])?;
                }
            }
            tx.commit()?;
            Ok(records.len())
        })
        .await
    }

    async fn count(&self) -> StorageResult<usize> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM prices", [], |row| row.get(0))?;
            Ok(count as usize)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::filter::DateBounds;
    use crate::storage::memory::MemoryStore;
    use crate::storage::types::PriceField;
    use tempfile::tempdir;

    fn sample_records() -> Vec<PriceRecord> {
        vec![
            PriceRecord::new("2020-01-31 10:00:00", "AAPL", 1.0, 2.0, 0.5, 1.5, 100.0),
            PriceRecord::new("2020-01-01", "AAPL", 2.0, 3.0, 1.5, 2.5, 200.0),
            PriceRecord::new("2020-02-01 00:00:01", "AAPL", 3.0, 4.0, 2.5, 3.5, 300.0),
            PriceRecord::new("2020-01-15", "MSFT", 10.0, 11.0, 9.0, 10.5, 50.0).dividends(0.2),
        ]
    }

    async fn create_test_store() -> (SqliteStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("prices.db")).unwrap();
        store.insert_many(sample_records()).await.unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn test_insert_and_count() {
        let (store, _dir) = create_test_store().await;
        assert_eq!(store.count().await.unwrap(), 4);
        assert_eq!(store.name(), "sqlite");
    }

    #[tokio::test]
    async fn test_find_distinct() {
        let (store, _dir) = create_test_store().await;
        let companies = store.find_distinct(TextKey::Company).await.unwrap();
        assert_eq!(companies, vec!["AAPL", "MSFT"]);
    }

    #[tokio::test]
    async fn test_find_one_round_trips_record() {
        let (store, _dir) = create_test_store().await;
        let first = store.find_one(SortOrder::Ascending).await.unwrap().unwrap();
        assert_eq!(first, sample_records()[1]);

        let last = store.find_one(SortOrder::Descending).await.unwrap().unwrap();
        assert_eq!(last.date, "2020-02-01 00:00:01");
    }

    #[tokio::test]
    async fn test_find_matches_memory_store() {
        let (sqlite, _dir) = create_test_store().await;
        let memory = MemoryStore::with_records(sample_records()).unwrap();

        let filters = [
            RecordFilter::new(),
            RecordFilter::new().company("AAPL"),
            RecordFilter::new().dates(DateBounds {
                from: Some("2020-01-01".to_string()),
                to: Some("2020-01-31 23:59:59".to_string()),
            }),
            RecordFilter::new().company("NOPE"),
        ];

        for filter in &filters {
            let projection = Projection::new(PriceField::Volume);
            let a = sqlite
                .find(filter, projection, Some(SortOrder::Ascending))
                .await
                .unwrap();
            let b = memory
                .find(filter, projection, Some(SortOrder::Ascending))
                .await
                .unwrap();
            assert_eq!(a, b, "filter {:?}", filter);
        }
    }

    #[tokio::test]
    async fn test_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("prices.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.insert_many(sample_records()).await.unwrap();
        }

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.count().await.unwrap(), 4);
        assert_eq!(reopened.path(), path.as_path());
    }

    #[tokio::test]
    async fn test_empty_store() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("empty.db")).unwrap();

        assert_eq!(store.count().await.unwrap(), 0);
        assert!(store.find_one(SortOrder::Ascending).await.unwrap().is_none());
        assert!(store.find_distinct(TextKey::Company).await.unwrap().is_empty());
        assert_eq!(store.insert_many(Vec::new()).await.unwrap(), 0);
    }
}
