//! Data Transfer Objects
//!
//! Response types for the API endpoints that are not query results themselves.
//! Series, metrics and date-range bodies serialize the query types directly.

use serde::{Deserialize, Serialize};

/// List companies response
#[derive(Debug, Serialize, Deserialize)]
pub struct CompaniesResponse {
    /// Distinct instrument identifiers, sorted
    pub companies: Vec<String>,
}

/// Full health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status: healthy or unhealthy
    pub status: String,
    /// Store backend name
    pub store: String,
    /// Number of stored records, when the store answered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<usize>,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
