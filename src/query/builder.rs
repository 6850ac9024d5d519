//! Query Builder
//!
//! Turns raw request parameters into a validated [`FilterCriteria`] and then into the
//! store-facing [`StoreQuery`] (filter predicate + projection).
//!
//! # Date handling
//!
//! Dates are compared as strings. `start_date` is used as-is as an inclusive lower
//! bound. A bare `end_date` gets an end-of-day suffix (`23:59:59`) so that records
//! stored with a time component on the end day still compare as `<=` the bound.
//! Either bound may also carry a ` HH:MM:SS` time, in which case it is used as given.
//!
//! ```rust,ignore
//! let criteria = FilterCriteria::new(PriceField::Close)
//!     .company("AAPL")
//!     .start_date("2020-01-01")
//!     .end_date("2020-01-31");
//!
//! let query = criteria.to_store_query();
//! // query.filter.dates.to == Some("2020-01-31 23:59:59")
//! ```

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::query::error::{QueryError, QueryResult};
use crate::storage::{DateBounds, PriceField, Projection, RecordFilter};

/// Suffix appended to the end date to make the upper bound cover the whole day
pub const END_OF_DAY: &str = " 23:59:59";

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Raw filter parameters as they arrive on a request
///
/// Empty strings are treated the same as absent parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterParams {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Validated filter for a single request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub field: PriceField,
    pub company: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Store-facing query: what to match and what to keep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreQuery {
    pub filter: RecordFilter,
    pub projection: Projection,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Check a bound is `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS` with a real calendar date
fn check_bound(param: &'static str, value: &str) -> QueryResult<()> {
    let invalid = || QueryError::InvalidDate {
        param,
        value: value.to_string(),
    };

    // chrono accepts unpadded months and days; string comparison needs fixed width
    let (day, time) = match value.len() {
        10 => (value, None),
        19 => (
            value.get(..10).ok_or_else(invalid)?,
            Some(value.get(10..).ok_or_else(invalid)?),
        ),
        _ => return Err(invalid()),
    };

    NaiveDate::parse_from_str(day, DATE_FORMAT).map_err(|_| invalid())?;

    if let Some(time) = time {
        let time = time.strip_prefix(' ').ok_or_else(invalid)?;
        NaiveTime::parse_from_str(time, TIME_FORMAT).map_err(|_| invalid())?;
    }

    Ok(())
}

/// Inclusive upper bound for an end date: bare days cover the whole day
fn upper_bound(end_date: &str) -> String {
    if end_date.len() == 10 {
        format!("{}{}", end_date, END_OF_DAY)
    } else {
        end_date.to_string()
    }
}

impl FilterParams {
    /// Parameters for a field with no other constraints
    pub fn for_field(field: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            ..Default::default()
        }
    }

    pub fn company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn start_date(mut self, date: impl Into<String>) -> Self {
        self.start_date = Some(date.into());
        self
    }

    pub fn end_date(mut self, date: impl Into<String>) -> Self {
        self.end_date = Some(date.into());
        self
    }

    /// Validate into criteria; nothing here touches the store
    pub fn validate(&self) -> QueryResult<FilterCriteria> {
        let field = present(&self.field).ok_or(QueryError::MissingParameter("field"))?;
        let field = field
            .parse::<PriceField>()
            .map_err(|e| QueryError::InvalidField(e.0))?;

        let start = present(&self.start_date);
        let end = present(&self.end_date);
        if let Some(start) = start {
            check_bound("start_date", start)?;
        }
        if let Some(end) = end {
            check_bound("end_date", end)?;
        }

        // Fixed-width bounds, so string order is chronological order
        if let (Some(start), Some(end)) = (start, end) {
            if start > upper_bound(end).as_str() {
                return Err(QueryError::InvalidDateRange {
                    start: start.to_string(),
                    end: end.to_string(),
                });
            }
        }

        Ok(FilterCriteria {
            field,
            company: present(&self.company).map(str::to_string),
            start_date: start.map(str::to_string),
            end_date: end.map(str::to_string),
        })
    }
}

impl FilterCriteria {
    /// Criteria selecting every record for a field
    pub fn new(field: PriceField) -> Self {
        Self {
            field,
            company: None,
            start_date: None,
            end_date: None,
        }
    }

    pub fn company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn start_date(mut self, date: impl Into<String>) -> Self {
        self.start_date = Some(date.into());
        self
    }

    pub fn end_date(mut self, date: impl Into<String>) -> Self {
        self.end_date = Some(date.into());
        self
    }

    /// Date bounds for the store, if either end was given
    pub fn date_bounds(&self) -> Option<DateBounds> {
        if self.start_date.is_none() && self.end_date.is_none() {
            return None;
        }

        Some(DateBounds {
            from: self.start_date.clone(),
            to: self.end_date.as_deref().map(upper_bound),
        })
    }

    /// Build the filter predicate and projection for the store
    pub fn to_store_query(&self) -> StoreQuery {
        let mut filter = RecordFilter::new();
        if let Some(company) = &self.company {
            filter = filter.company(company.clone());
        }
        if let Some(bounds) = self.date_bounds() {
            filter = filter.dates(bounds);
        }

        StoreQuery {
            filter,
            projection: Projection::new(self.field),
        }
    }
}

/// Validate raw parameters and build the store query in one step
pub fn build_query(params: &FilterParams) -> QueryResult<(FilterCriteria, StoreQuery)> {
    let criteria = params.validate()?;
    let query = criteria.to_store_query();
    Ok((criteria, query))
}
