//! Stockview API Client
//!
//! HTTP client for the Stockview REST API, used by the CLI.
//!
//! Besides one call per endpoint it can compare several instruments at once:
//! requests for each company are sent concurrently, a company whose request fails is
//! logged and left out, and only a comparison with no results at all is an error.

use futures_util::future::join_all;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

use crate::api::dto::CompaniesResponse;
use crate::api::error::ErrorResponse;
use crate::query::{DateRange, FieldMetrics, SeriesPoint};
use crate::storage::PriceField;

/// Maximum number of instruments in one comparison
pub const MAX_COMPARE_COMPANIES: usize = 5;

/// Errors returned by the API client
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("At most {max} companies can be compared, got {got}")]
    TooManyCompanies { got: usize, max: usize },

    #[error("At least one company is required")]
    NoCompanies,

    #[error("No data returned for any of the requested companies")]
    NoData,

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl ClientError {
    /// True when the API answered 404 (no matching data)
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Api { status: 404, .. })
    }
}

/// Filter for series and metrics requests; dates are `YYYY-MM-DD[ HH:MM:SS]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeriesRequest {
    pub company: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl SeriesRequest {
    pub fn new() -> Self {
        Self::default()
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

    fn query_pairs(&self, field: PriceField) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("field", field.as_str().to_string())];
        if let Some(company) = &self.company {
            pairs.push(("company", company.clone()));
        }
        if let Some(start) = &self.start_date {
            pairs.push(("start_date", start.clone()));
        }
        if let Some(end) = &self.end_date {
            pairs.push(("end_date", end.clone()));
        }
        pairs
    }
}

/// Per-company results of a comparison, in request order
#[derive(Debug, Clone)]
pub struct Comparison<T> {
    pub results: Vec<(String, T)>,
    /// Companies whose request failed, with the reason
    pub skipped: Vec<(String, String)>,
}

/// Stockview REST API client
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the API at `base_url` (e.g. `http://localhost:3000`)
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, path: &str, query: &[(&'static str, String)]) -> Result<Response, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).query(query).send().await?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorResponse>(&text) {
            Ok(body) => body.error.message,
            Err(_) => text,
        };

        Err(ClientError::Api { status, message })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, ClientError> {
        Ok(self.get(path, query).await?.json().await?)
    }

    /// Distinct companies, sorted
    pub async fn companies(&self) -> Result<Vec<String>, ClientError> {
        let body: CompaniesResponse = self.get_json("/api/companies", &[]).await?;
        Ok(body.companies)
    }

    /// Series of `field` matching `request`, ascending by date
    pub async fn series(
        &self,
        field: PriceField,
        request: &SeriesRequest,
    ) -> Result<Vec<SeriesPoint>, ClientError> {
        let rows: Vec<serde_json::Value> = self
            .get_json("/api/measurements", &request.query_pairs(field))
            .await?;

        rows.iter()
            .map(|row| {
                SeriesPoint::from_json(field, row)
                    .ok_or_else(|| ClientError::Malformed(format!("unexpected series row: {}", row)))
            })
            .collect()
    }

    /// Summary statistics of `field` matching `request`
    pub async fn metrics(
        &self,
        field: PriceField,
        request: &SeriesRequest,
    ) -> Result<FieldMetrics, ClientError> {
        self.get_json("/api/measurements/metrics", &request.query_pairs(field))
            .await
    }

    /// Earliest and latest stored days
    pub async fn date_range(&self) -> Result<DateRange, ClientError> {
        self.get_json("/api/date-range", &[]).await
    }

    /// Series of `field` for each company over the same date window
    pub async fn compare_series(
        &self,
        field: PriceField,
        companies: &[String],
        window: &SeriesRequest,
    ) -> Result<Comparison<Vec<SeriesPoint>>, ClientError> {
        fan_out(companies, |company| {
            let request = window.clone().company(company);
            async move { self.series(field, &request).await }
        })
        .await
    }

    /// Metrics of `field` for each company over the same date window
    pub async fn compare_metrics(
        &self,
        field: PriceField,
        companies: &[String],
        window: &SeriesRequest,
    ) -> Result<Comparison<FieldMetrics>, ClientError> {
        fan_out(companies, |company| {
            let request = window.clone().company(company);
            async move { self.metrics(field, &request).await }
        })
        .await
    }
}

/// Check the company list of a comparison: non-empty, at most five, no duplicates
pub fn check_companies(companies: &[String]) -> Result<Vec<String>, ClientError> {
    let mut unique: Vec<String> = Vec::with_capacity(companies.len());
    for company in companies {
        let company = company.trim();
        if !company.is_empty() && !unique.iter().any(|c| c == company) {
            unique.push(company.to_string());
        }
    }

    if unique.is_empty() {
        return Err(ClientError::NoCompanies);
    }
    if unique.len() > MAX_COMPARE_COMPANIES {
        return Err(ClientError::TooManyCompanies {
            got: unique.len(),
            max: MAX_COMPARE_COMPANIES,
        });
    }
    Ok(unique)
}

/// Run one request per company concurrently, keeping the ones that succeed
async fn fan_out<T, F, Fut>(companies: &[String], request: F) -> Result<Comparison<T>, ClientError>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let companies = check_companies(companies)?;

    let outcomes = join_all(companies.iter().cloned().map(&request)).await;

    let mut results = Vec::new();
    let mut skipped = Vec::new();
    for (company, outcome) in companies.into_iter().zip(outcomes) {
        match outcome {
            Ok(value) => results.push((company, value)),
            Err(e) => {
                tracing::warn!(company = %company, error = %e, "Skipping company in comparison");
                skipped.push((company, e.to_string()));
            }
        }
    }

    if results.is_empty() {
        return Err(ClientError::NoData);
    }

    Ok(Comparison { results, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{build_router, AppState};
    use crate::config::ApiConfig;
    use crate::storage::{MemoryStore, PriceRecord};
    use std::sync::Arc;

    fn record(date: &str, company: &str, close: f64) -> PriceRecord {
        PriceRecord::new(date, company, close, close + 1.0, close - 1.0, close, 1e6)
    }

    async fn spawn_server() -> ApiClient {
        let store = MemoryStore::with_records(vec![
            record("2020-01-02 00:00:00", "AAPL", 75.0),
            record("2020-01-03 00:00:00", "AAPL", 74.0),
            record("2020-01-02 00:00:00", "MSFT", 160.0),
            record("2020-01-06 00:00:00", "MSFT", 159.0),
        ])
        .unwrap();
        let router = build_router(AppState::from_store(Arc::new(store), ApiConfig::default()));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        ApiClient::new(format!("http://{}/", addr), Duration::from_secs(5)).unwrap()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_check_companies() {
        assert!(matches!(check_companies(&[]), Err(ClientError::NoCompanies)));
        assert!(matches!(
            check_companies(&names(&["", "  "])),
            Err(ClientError::NoCompanies)
        ));

        let six = names(&["A", "B", "C", "D", "E", "F"]);
        assert!(matches!(
            check_companies(&six),
            Err(ClientError::TooManyCompanies { got: 6, max: 5 })
        ));

        let deduped = check_companies(&names(&["AAPL", " AAPL", "MSFT"])).unwrap();
        assert_eq!(deduped, names(&["AAPL", "MSFT"]));
    }

    #[test]
    fn test_query_pairs() {
        let request = SeriesRequest::new().company("AAPL").end_date("2020-01-31");
        let pairs = request.query_pairs(PriceField::High);
        assert_eq!(
            pairs,
            vec![
                ("field", "High".to_string()),
                ("company", "AAPL".to_string()),
                ("end_date", "2020-01-31".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_endpoints() {
        let client = spawn_server().await;

        assert_eq!(client.companies().await.unwrap(), names(&["AAPL", "MSFT"]));

        let series = client
            .series(PriceField::Close, &SeriesRequest::new().company("AAPL"))
            .await
            .unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].value, 75.0);
        assert_eq!(series[1].timestamp, "2020-01-03 00:00:00");

        let metrics = client
            .metrics(PriceField::Close, &SeriesRequest::new().company("MSFT"))
            .await
            .unwrap();
        assert_eq!(metrics.count, 2);
        assert_eq!(metrics.stats.avg, 159.5);

        let range = client.date_range().await.unwrap();
        assert_eq!(range.min_date, "2020-01-02");
        assert_eq!(range.max_date, "2020-01-06");
    }

    #[tokio::test]
    async fn test_api_error_message() {
        let client = spawn_server().await;

        let err = client
            .series(PriceField::Close, &SeriesRequest::new().company("TSLA"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("No data found"));
    }

    #[tokio::test]
    async fn test_compare_skips_failing_company() {
        let client = spawn_server().await;

        let comparison = client
            .compare_metrics(
                PriceField::Close,
                &names(&["AAPL", "TSLA", "MSFT"]),
                &SeriesRequest::new(),
            )
            .await
            .unwrap();

        let got: Vec<&str> = comparison.results.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(got, vec!["AAPL", "MSFT"]);
        assert_eq!(comparison.skipped.len(), 1);
        assert_eq!(comparison.skipped[0].0, "TSLA");
    }

    #[tokio::test]
    async fn test_compare_all_failing() {
        let client = spawn_server().await;

        let err = client
            .compare_series(
                PriceField::Open,
                &names(&["TSLA", "GOOG"]),
                &SeriesRequest::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::NoData));
    }
}
