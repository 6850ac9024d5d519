//! Record filters and projections
//!
//! `RecordFilter` is the store-facing predicate built by the query builder. The memory
//! store evaluates it with [`RecordFilter::matches`]; the SQLite store renders the same
//! predicate as a `WHERE` clause.

use crate::storage::types::{PriceField, PriceRecord, ProjectedRecord};

/// Inclusive date bounds, compared as strings
///
/// Stored dates are `YYYY-MM-DD` optionally followed by a time. Lexicographic comparison
/// orders them correctly only because that prefix is fixed-width and zero-padded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateBounds {
    /// Lower bound (inclusive)
    pub from: Option<String>,
    /// Upper bound (inclusive)
    pub to: Option<String>,
}

impl DateBounds {
    pub fn contains(&self, date: &str) -> bool {
        if let Some(from) = &self.from {
            if date < from.as_str() {
                return false;
            }
        }
        if let Some(to) = &self.to {
            if date > to.as_str() {
                return false;
            }
        }
        true
    }
}

/// Predicate over price records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    /// Exact-match instrument identifier
    pub company: Option<String>,
    /// Date range, when either bound was requested
    pub dates: Option<DateBounds>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn dates(mut self, bounds: DateBounds) -> Self {
        self.dates = Some(bounds);
        self
    }

    /// Check if a record matches this filter
    pub fn matches(&self, record: &PriceRecord) -> bool {
        if let Some(company) = &self.company {
            if &record.company != company {
                return false;
            }
        }

        if let Some(bounds) = &self.dates {
            if !bounds.contains(&record.date) {
                return false;
            }
        }

        true
    }

    /// Render as a SQL `WHERE` clause with positional parameters.
    ///
    /// Returns an empty clause when the filter matches everything.
    pub fn to_sql(&self) -> (String, Vec<String>) {
        let mut clauses = Vec::new();
        let mut params = Vec::new();

        if let Some(company) = &self.company {
            clauses.push("company = ?");
            params.push(company.clone());
        }

        if let Some(bounds) = &self.dates {
            if let Some(from) = &bounds.from {
                clauses.push("date >= ?");
                params.push(from.clone());
            }
            if let Some(to) = &bounds.to {
                clauses.push("date <= ?");
                params.push(to.clone());
            }
        }

        if clauses.is_empty() {
            (String::new(), params)
        } else {
            (format!(" WHERE {}", clauses.join(" AND ")), params)
        }
    }
}

/// Attributes to keep from each matched record: always date and company, plus one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    pub field: PriceField,
}

impl Projection {
    pub fn new(field: PriceField) -> Self {
        Self { field }
    }

    /// Column list for the SQLite store
    pub fn columns(&self) -> String {
        format!("date, company, {}", self.field.column())
    }

    pub fn apply(&self, record: &PriceRecord) -> ProjectedRecord {
        ProjectedRecord {
            date: record.date.clone(),
            company: record.company.clone(),
            value: self.field.value(record),
        }
    }
}
