//! CSV Import
//!
//! Loads a historical price dataset into a record store. The expected layout is the
//! usual daily OHLCV export:
//!
//! ```text
//! Date,Open,High,Low,Close,Volume,Dividends,Stock Splits,Company
//! 2020-01-02 00:00:00-05:00,74.06,75.15,73.80,75.09,135480400,0.0,0.0,AAPL
//! ```
//!
//! `Dividends` and `Stock Splits` are optional. Files without a `Company` column can be
//! imported with [`CsvImporter::with_default_company`]. ISO timestamps
//! (`2020-01-02T00:00:00`) are stored with a space separator like every other date.

use serde::Deserialize;
use std::io::Read;
use std::path::Path;

use crate::storage::{PriceRecord, RecordStore, StorageError};

/// Maximum number of row errors kept in a result
const MAX_REPORTED_ERRORS: usize = 100;

/// Errors that abort an import
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// One CSV row as exported
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date", alias = "date")]
    date: String,
    #[serde(rename = "Open", alias = "open")]
    open: f64,
    #[serde(rename = "High", alias = "high")]
    high: f64,
    #[serde(rename = "Low", alias = "low")]
    low: f64,
    #[serde(rename = "Close", alias = "close")]
    close: f64,
    #[serde(rename = "Volume", alias = "volume")]
    volume: f64,
    #[serde(rename = "Dividends", alias = "dividends", default)]
    dividends: Option<f64>,
    #[serde(rename = "Stock Splits", alias = "stock_splits", default)]
    stock_splits: Option<f64>,
    #[serde(rename = "Company", alias = "company", default)]
    company: Option<String>,
}

/// CSV importer with an optional fallback company
#[derive(Debug, Default)]
pub struct CsvImporter {
    default_company: Option<String>,
}

/// Result of parsing a CSV file
#[derive(Debug)]
pub struct CsvImportResult {
    pub records: Vec<PriceRecord>,
    pub rows_processed: usize,
    pub rows_failed: usize,
    pub errors: Vec<String>,
}

/// Outcome of loading a file into a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    pub rows_failed: usize,
}

/// Rewrite `YYYY-MM-DDThh..` as `YYYY-MM-DD hh..`; other dates pass through
fn normalize_date(date: &str) -> String {
    match (date.get(..10), date.get(10..).and_then(|rest| rest.strip_prefix('T'))) {
        (Some(day), Some(time)) => format!("{} {}", day, time),
        _ => date.to_string(),
    }
}

impl CsvImporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Company used for rows whose `Company` column is missing or empty
    pub fn with_default_company(mut self, company: impl Into<String>) -> Self {
        self.default_company = Some(company.into());
        self
    }

    fn to_record(&self, row: CsvRow) -> Result<PriceRecord, String> {
        let company = row
            .company
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .or_else(|| self.default_company.clone())
            .ok_or_else(|| "missing company".to_string())?;

        let record = PriceRecord::new(
            normalize_date(row.date.trim()),
            company,
            row.open,
            row.high,
            row.low,
            row.close,
            row.volume,
        )
        .dividends(row.dividends.unwrap_or(0.0))
        .stock_splits(row.stock_splits.unwrap_or(0.0));

        record.validate().map_err(|e| e.to_string())?;
        Ok(record)
    }

    /// Parse records from any reader; bad rows are counted and reported, not fatal
    pub fn read<R: Read>(&self, input: R) -> Result<CsvImportResult, ImportError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(input);

        let mut records = Vec::new();
        let mut rows_failed = 0;
        let mut errors = Vec::new();

        for (line_num, result) in reader.deserialize::<CsvRow>().enumerate() {
            // Header is line 1
            let actual_line = line_num + 2;

            let converted = result
                .map_err(|e| e.to_string())
                .and_then(|row| self.to_record(row));

            match converted {
                Ok(record) => records.push(record),
                Err(e) => {
                    errors.push(format!("Line {}: {}", actual_line, e));
                    rows_failed += 1;
                }
            }
        }

        // Truncate errors if too many
        if errors.len() > MAX_REPORTED_ERRORS {
            let total = errors.len();
            errors.truncate(MAX_REPORTED_ERRORS);
            errors.push(format!("... and {} more errors", total - MAX_REPORTED_ERRORS));
        }

        Ok(CsvImportResult {
            rows_processed: records.len(),
            records,
            rows_failed,
            errors,
        })
    }

    /// Parse records from a file
    pub fn read_path(&self, path: &Path) -> Result<CsvImportResult, ImportError> {
        let file = std::fs::File::open(path)?;
        self.read(std::io::BufReader::new(file))
    }

    /// Parse a file and insert every valid row into `store`
    pub async fn import_into(
        &self,
        store: &dyn RecordStore,
        path: &Path,
    ) -> Result<ImportSummary, ImportError> {
        let result = self.read_path(path)?;

        for error in &result.errors {
            tracing::warn!(path = ?path, "Skipped row: {}", error);
        }

        let inserted = store.insert_many(result.records).await?;

        tracing::info!(
            path = ?path,
            inserted,
            rows_failed = result.rows_failed,
            "CSV import complete"
        );

        Ok(ImportSummary {
            inserted,
            rows_failed: result.rows_failed,
        })
    }
}
