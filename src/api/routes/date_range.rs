//! Date Range Routes
//!
//! - GET /api/date-range - Earliest and latest stored day

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::query::DateRange;

/// GET /api/date-range
///
/// Returns `{minDate, maxDate}` across the whole dataset, or 404 when it is empty.
pub async fn get_date_range(State(state): State<Arc<AppState>>) -> ApiResult<Json<DateRange>> {
    let range = state.service.get_date_range().await?;
    Ok(Json(range))
}
