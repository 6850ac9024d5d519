//! Stockview REST API
//!
//! HTTP API layer for Stockview, built with Axum.
//!
//! # Endpoints
//!
//! ## Data
//! - `GET /api/companies` - List all companies
//! - `GET /api/measurements` - Field series for a filter
//! - `GET /api/measurements/metrics` - Summary statistics for a filter
//! - `GET /api/date-range` - Earliest and latest stored day
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use stockview::api::{serve, AppState};
//! use stockview::config::ApiConfig;
//! use stockview::storage::SqliteStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(SqliteStore::open("./stockview_data/prices.db")?);
//!     let config = ApiConfig::default();
//!
//!     let state = AppState::from_store(store, config.clone());
//!     serve(state, &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ApiConfig;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/companies", get(routes::companies::list_companies))
        .route("/measurements", get(routes::measurements::get_series))
        .route("/measurements/metrics", get(routes::measurements::get_metrics))
        .route("/date-range", get(routes::date_range::get_date_range));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config);
    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api", api_routes)
        .nest("/health", health_routes)
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// CORS policy: any origin when none are configured, otherwise the configured list
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET])
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Stockview API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Stockview API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::ErrorResponse;
    use crate::storage::{MemoryStore, PriceRecord};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn record(date: &str, company: &str, close: f64) -> PriceRecord {
        PriceRecord::new(date, company, close, close + 1.0, close - 1.0, close, 5e6)
    }

    fn create_test_app(records: Vec<PriceRecord>) -> Router {
        let store = Arc::new(MemoryStore::with_records(records).unwrap());
        let state = AppState::from_store(store, ApiConfig::default());
        build_router(state)
    }

    fn seeded_app() -> Router {
        create_test_app(vec![
            record("2020-01-02 00:00:00", "MSFT", 160.0),
            record("2020-01-03 00:00:00", "AAPL", 74.0),
            record("2020-01-02 00:00:00", "AAPL", 75.0),
            record("2020-01-31 10:00:00", "AAPL", 77.0),
            record("2020-02-01 00:00:01", "AAPL", 78.0),
        ])
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_health_live() {
        let (status, _) = get(seeded_app(), "/health/live").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready() {
        let (status, _) = get(seeded_app(), "/health/ready").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_full() {
        let (status, body) = get(seeded_app(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["store"], "memory");
        assert_eq!(body["records"], 5);
    }

    #[tokio::test]
    async fn test_list_companies() {
        let (status, body) = get(seeded_app(), "/api/companies").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"companies": ["AAPL", "MSFT"]}));
    }

    #[tokio::test]
    async fn test_series() {
        let (status, body) = get(
            seeded_app(),
            "/api/measurements?field=Close&company=AAPL&start_date=2020-01-01&end_date=2020-01-31",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["timestamp"], "2020-01-02 00:00:00");
        assert_eq!(rows[0]["Close"], 75.0);
        assert_eq!(rows[0]["company"], "AAPL");
        assert_eq!(rows[2]["timestamp"], "2020-01-31 10:00:00");
    }

    #[tokio::test]
    async fn test_series_empty_company_means_all() {
        let (status, body) = get(seeded_app(), "/api/measurements?field=Open&company=").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_metrics() {
        let (status, body) = get(
            seeded_app(),
            "/api/measurements/metrics?field=Close&company=AAPL&end_date=2020-01-03",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["field"], "Close");
        assert_eq!(body["count"], 2);
        assert_eq!(body["avg"], 74.5);
        assert_eq!(body["min"], 74.0);
        assert_eq!(body["max"], 75.0);
        assert_eq!(body["stdDev"], 0.5);
    }

    #[tokio::test]
    async fn test_missing_field() {
        let (status, body) = get(seeded_app(), "/api/measurements").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let err: ErrorResponse = serde_json::from_value(body).unwrap();
        assert_eq!(err.error.code, "MISSING_PARAMETER");
        assert!(!err.request_id.is_empty());
    }

    #[tokio::test]
    async fn test_lowercase_field_rejected() {
        let (status, body) = get(seeded_app(), "/api/measurements/metrics?field=close").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_FIELD");
    }

    #[tokio::test]
    async fn test_invalid_date() {
        let (status, body) =
            get(seeded_app(), "/api/measurements?field=Close&start_date=01/02/2020").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_DATE");
    }

    #[tokio::test]
    async fn test_no_data_is_not_found() {
        let (status, body) =
            get(seeded_app(), "/api/measurements?field=Close&company=TSLA").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NO_DATA_FOUND");
    }

    #[tokio::test]
    async fn test_date_range() {
        let (status, body) = get(seeded_app(), "/api/date-range").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!({"minDate": "2020-01-02", "maxDate": "2020-02-01"})
        );
    }

    #[tokio::test]
    async fn test_date_range_empty_store() {
        let (status, _) = get(create_test_app(Vec::new()), "/api/date-range").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
