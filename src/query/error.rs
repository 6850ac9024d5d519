//! Query error types
//!
//! Defines all error conditions that can occur while validating and answering a query.

use thiserror::Error;

use crate::storage::PriceField;

/// Errors that can occur during query operations
#[derive(Error, Debug)]
pub enum QueryError {
    /// A required request parameter was absent or empty
    #[error("{0} parameter is required")]
    MissingParameter(&'static str),

    /// The requested field is not one of the canonical price fields
    #[error("Invalid field '{0}'. Must be one of: {valid}", valid = PriceField::valid_names())]
    InvalidField(String),

    /// A date parameter is not a `YYYY-MM-DD[ HH:MM:SS]` calendar date
    #[error("Invalid {param}: '{value}'. Expected YYYY-MM-DD or YYYY-MM-DD HH:MM:SS")]
    InvalidDate { param: &'static str, value: String },

    /// The start date falls after the end date
    #[error("Start date {start} must not be after end date {end}")]
    InvalidDateRange { start: String, end: String },

    /// The query ran but matched zero records
    #[error("No data found for the specified criteria")]
    NoDataFound,

    /// Record store failure
    #[error("Storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),
}

impl QueryError {
    /// Whether the caller caused this error (as opposed to a store fault)
    pub fn is_client_error(&self) -> bool {
        !matches!(self, QueryError::Storage(_))
    }
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;

    #[test]
    fn test_error_display() {
        assert_eq!(
            QueryError::MissingParameter("field").to_string(),
            "field parameter is required"
        );
        assert_eq!(
            QueryError::InvalidField("close".to_string()).to_string(),
            "Invalid field 'close'. Must be one of: Open, High, Low, Close, Volume"
        );
        assert_eq!(
            QueryError::NoDataFound.to_string(),
            "No data found for the specified criteria"
        );
    }

    #[test]
    fn test_client_error_classification() {
        assert!(QueryError::NoDataFound.is_client_error());
        assert!(QueryError::InvalidField("x".to_string()).is_client_error());
        assert!(!QueryError::Storage(StorageError::Lock("x".to_string())).is_client_error());
    }
}
