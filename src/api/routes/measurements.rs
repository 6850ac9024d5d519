//! Measurement Routes
//!
//! Field series and summary statistics over a filtered subset.
//!
//! - GET /api/measurements - Field series sorted by date
//! - GET /api/measurements/metrics - count, avg, min, max, stdDev
//!
//! Both accept `field` (required), `company`, `start_date` and `end_date`.

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::query::{FieldMetrics, FilterParams, SeriesPoint};

/// GET /api/measurements
pub async fn get_series(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterParams>,
) -> ApiResult<Json<Vec<SeriesPoint>>> {
    let series = state.service.get_series(&params).await?;
    Ok(Json(series))
}

/// GET /api/measurements/metrics
pub async fn get_metrics(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterParams>,
) -> ApiResult<Json<FieldMetrics>> {
    let metrics = state.service.get_metrics(&params).await?;
    Ok(Json(metrics))
}
