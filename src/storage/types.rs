//! Core data types for the price record store
//!
//! This module defines the fundamental types used throughout the storage layer:
//! - `PriceRecord`: One instrument's price snapshot for one day
//! - `PriceField`: The five numeric observed quantities
//! - `ProjectedRecord`: A record reduced to date, company and one field
//! - `TextKey` and `SortOrder`: Distinct-value and ordering selectors

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::OnceLock;

use crate::storage::error::{StorageError, StorageResult};

/// A single daily price snapshot
///
/// Field names follow the stored schema (`Date`, `Open`, ..., `Stock Splits`, `Company`),
/// so CSV exports of the dataset deserialize directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceRecord {
    /// Sortable date string, `YYYY-MM-DD` optionally followed by a time component
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Open")]
    pub open: f64,
    #[serde(rename = "High")]
    pub high: f64,
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Volume")]
    pub volume: f64,
    #[serde(rename = "Dividends", default)]
    pub dividends: f64,
    #[serde(rename = "Stock Splits", default)]
    pub stock_splits: f64,
    /// Instrument identifier (ticker or name)
    #[serde(rename = "Company")]
    pub company: String,
}

fn date_prefix() -> &'static Regex {
    static DATE_PREFIX: OnceLock<Regex> = OnceLock::new();
    DATE_PREFIX.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{2}-\d{2}( .*)?$").expect("date prefix pattern is valid")
    })
}

impl PriceRecord {
    /// Create a record with zero dividends and splits
    pub fn new(
        date: impl Into<String>,
        company: impl Into<String>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            date: date.into(),
            open,
            high,
            low,
            close,
            volume,
            dividends: 0.0,
            stock_splits: 0.0,
            company: company.into(),
        }
    }

    /// Builder method: set dividends
    pub fn dividends(mut self, dividends: f64) -> Self {
        self.dividends = dividends;
        self
    }

    /// Builder method: set stock splits
    pub fn stock_splits(mut self, splits: f64) -> Self {
        self.stock_splits = splits;
        self
    }

    /// Check the record invariants before it enters a store.
    ///
    /// Every date must start with the fixed-width `YYYY-MM-DD` prefix, and any time part
    /// must follow a single space. Range filters compare dates as plain strings and are
    /// only correct under that format.
    pub fn validate(&self) -> StorageResult<()> {
        if self.company.trim().is_empty() {
            return Err(StorageError::InvalidRecord(format!(
                "record dated {} has an empty company",
                self.date
            )));
        }

        if !date_prefix().is_match(&self.date) {
            return Err(StorageError::InvalidRecord(format!(
                "date '{}' is not YYYY-MM-DD[ time]",
                self.date
            )));
        }

        let numbers = [self.open, self.high, self.low, self.close, self.volume];
        if numbers.iter().any(|v| !v.is_finite()) {
            return Err(StorageError::InvalidRecord(format!(
                "record {} {} has a non-finite price or volume",
                self.company, self.date
            )));
        }

        Ok(())
    }

    /// The date portion of `date`, without any time suffix
    pub fn day(&self) -> &str {
        day_part(&self.date)
    }
}

/// Strip the time component from a stored date string
pub fn day_part(date: &str) -> &str {
    date.split(' ').next().unwrap_or(date)
}

/// One of the five numeric observed quantities of a price record
///
/// Names are case-sensitive and match the stored schema.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl PriceField {
    /// Get all fields in schema order
    pub fn all() -> &'static [PriceField] {
        &[
            PriceField::Open,
            PriceField::High,
            PriceField::Low,
            PriceField::Close,
            PriceField::Volume,
        ]
    }

    /// Canonical name, as used in requests and responses
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceField::Open => "Open",
            PriceField::High => "High",
            PriceField::Low => "Low",
            PriceField::Close => "Close",
            PriceField::Volume => "Volume",
        }
    }

    /// Column holding this field in the SQLite store
    pub fn column(&self) -> &'static str {
        match self {
            PriceField::Open => "open",
            PriceField::High => "high",
            PriceField::Low => "low",
            PriceField::Close => "close",
            PriceField::Volume => "volume",
        }
    }

    /// Read this field from a record
    pub fn value(&self, record: &PriceRecord) -> f64 {
        match self {
            PriceField::Open => record.open,
            PriceField::High => record.high,
            PriceField::Low => record.low,
            PriceField::Close => record.close,
            PriceField::Volume => record.volume,
        }
    }

    /// Comma-separated list of valid names, for error messages
    pub fn valid_names() -> String {
        Self::all()
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for PriceField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Error returned when a string is not a canonical field name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field '{0}', expected one of: Open, High, Low, Close, Volume")]
pub struct UnknownField(pub String);

impl FromStr for PriceField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PriceField::all()
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// Text attributes that support distinct-value queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKey {
    Company,
}

impl TextKey {
    /// Column holding this attribute in the SQLite store
    pub fn column(&self) -> &'static str {
        match self {
            TextKey::Company => "company",
        }
    }

    /// Read this attribute from a record
    pub fn value<'a>(&self, record: &'a PriceRecord) -> &'a str {
        match self {
            TextKey::Company => &record.company,
        }
    }
}

/// Ordering by date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn sql(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

/// A record reduced to the projected attributes: date, company and one field value
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedRecord {
    pub date: String,
    pub company: String,
    pub value: f64,
}
