//! Stockview Query Engine
//!
//! Turns request parameters into store queries and shapes the results:
//!
//! - **Builder**: Validate parameters, build the filter predicate and projection
//! - **Stats**: Summary statistics over a value sequence
//! - **Service**: Series, metrics, companies and date-range operations
//!
//! # Examples
//!
//! ```rust,ignore
//! use stockview::query::{FilterParams, QueryService};
//!
//! let service = QueryService::new(store);
//!
//! let params = FilterParams::for_field("Close")
//!     .company("AAPL")
//!     .start_date("2020-01-01")
//!     .end_date("2020-12-31");
//!
//! let series = service.get_series(&params).await?;
//! let metrics = service.get_metrics(&params).await?;
//! ```

mod builder;
mod error;
mod service;
mod stats;

pub use builder::{build_query, FilterCriteria, FilterParams, StoreQuery, END_OF_DAY};
pub use error::{QueryError, QueryResult};
pub use service::{DateRange, FieldMetrics, QueryService, SeriesPoint};
pub use stats::{compute_stats, round4, StatSummary};
