//! Company Routes
//!
//! - GET /api/companies - List all instruments in the dataset

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::CompaniesResponse;
use crate::api::error::ApiResult;
use crate::api::state::AppState;

/// GET /api/companies
///
/// Distinct company identifiers, sorted lexicographically.
pub async fn list_companies(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<CompaniesResponse>> {
    let companies = state.service.list_companies().await?;
    Ok(Json(CompaniesResponse { companies }))
}
