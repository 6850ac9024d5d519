//! Query Service
//!
//! Answers the four read operations over an injected record store:
//!
//! ```text
//! FilterParams → validate → StoreQuery → RecordStore::find → shape → result
//! ```
//!
//! Validation errors are returned before the store is touched. A query that runs but
//! matches nothing is reported as [`QueryError::NoDataFound`], never as an empty list.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::sync::Arc;
use std::time::Instant;

use crate::query::builder::{build_query, FilterParams};
use crate::query::error::{QueryError, QueryResult};
use crate::query::stats::{compute_stats, StatSummary};
use crate::storage::{day_part, PriceField, RecordStore, SortOrder, TextKey};

/// One point of a field series
///
/// Serializes as `{"timestamp": .., "company": .., "<Field>": value}` where the value
/// key is the canonical field name.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub timestamp: String,
    pub company: String,
    pub field: PriceField,
    pub value: f64,
}

impl Serialize for SeriesPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("timestamp", &self.timestamp)?;
        map.serialize_entry(self.field.as_str(), &self.value)?;
        map.serialize_entry("company", &self.company)?;
        map.end()
    }
}

impl SeriesPoint {
    /// Read a serialized point back, given the field it was requested for
    pub fn from_json(field: PriceField, value: &serde_json::Value) -> Option<Self> {
        Some(Self {
            timestamp: value.get("timestamp")?.as_str()?.to_string(),
            company: value.get("company")?.as_str()?.to_string(),
            field,
            value: value.get(field.as_str())?.as_f64()?,
        })
    }
}

/// Summary statistics for one field over a filtered subset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMetrics {
    pub field: PriceField,
    pub count: usize,
    #[serde(flatten)]
    pub stats: StatSummary,
}

/// Earliest and latest stored days
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub min_date: String,
    pub max_date: String,
}

/// Stateless query orchestration over a record store
pub struct QueryService {
    store: Arc<dyn RecordStore>,
}

impl QueryService {
    /// Create a service reading from `store`
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// The injected store
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Distinct company identifiers, sorted
    pub async fn list_companies(&self) -> QueryResult<Vec<String>> {
        let mut companies = self.store.find_distinct(TextKey::Company).await?;
        // Adapters promise sorted unique output; normalise anyway
        companies.sort();
        companies.dedup();
        tracing::debug!(companies = companies.len(), "Listed companies");
        Ok(companies)
    }

    /// Field series matching `params`, sorted ascending by date
    pub async fn get_series(&self, params: &FilterParams) -> QueryResult<Vec<SeriesPoint>> {
        let start = Instant::now();
        let (criteria, query) = build_query(params)?;

        let mut rows = self
            .store
            .find(&query.filter, query.projection, Some(SortOrder::Ascending))
            .await?;

        if rows.is_empty() {
            tracing::debug!(?criteria, "Series query matched no records");
            return Err(QueryError::NoDataFound);
        }

        // Stable, so same-day rows keep the store's relative order
        rows.sort_by(|a, b| a.date.cmp(&b.date));

        let points: Vec<SeriesPoint> = rows
            .into_iter()
            .map(|r| SeriesPoint {
                timestamp: r.date,
                company: r.company,
                field: criteria.field,
                value: r.value,
            })
            .collect();

        tracing::debug!(
            field = %criteria.field,
            company = ?criteria.company,
            points = points.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Series query complete"
        );

        Ok(points)
    }

    /// Summary statistics of the requested field over records matching `params`
    pub async fn get_metrics(&self, params: &FilterParams) -> QueryResult<FieldMetrics> {
        let start = Instant::now();
        let (criteria, query) = build_query(params)?;

        let rows = self
            .store
            .find(&query.filter, query.projection, None)
            .await?;

        if rows.is_empty() {
            tracing::debug!(?criteria, "Metrics query matched no records");
            return Err(QueryError::NoDataFound);
        }

        let values: Vec<f64> = rows.iter().map(|r| r.value).collect();
        let metrics = FieldMetrics {
            field: criteria.field,
            count: values.len(),
            stats: compute_stats(&values),
        };

        tracing::debug!(
            field = %criteria.field,
            company = ?criteria.company,
            count = metrics.count,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Metrics query complete"
        );

        Ok(metrics)
    }

    /// Day of the earliest and latest stored records across the whole dataset
    pub async fn get_date_range(&self) -> QueryResult<DateRange> {
        let (first, last) = tokio::try_join!(
            self.store.find_one(SortOrder::Ascending),
            self.store.find_one(SortOrder::Descending),
        )?;

        match (first, last) {
            (Some(first), Some(last)) => {
                let range = DateRange {
                    min_date: day_part(&first.date).to_string(),
                    max_date: day_part(&last.date).to_string(),
                };
                tracing::debug!(?range, "Date range query complete");
                Ok(range)
            }
            _ => {
                tracing::debug!("Date range requested on an empty store");
                Err(QueryError::NoDataFound)
            }
        }
    }
}
