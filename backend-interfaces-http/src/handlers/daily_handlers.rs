use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use backend_application::commands::daily_commands;
use backend_application::queries::daily_queries;
use backend_application::AppState;
use backend_domain::{CleanupOutcome, CleanupQuery, DailyStore, RangeQuery};

use crate::error::HttpError;

pub async fn get_daily(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<DailyStore>, HttpError> {
    let store = daily_queries::get_daily_range(&state, query).await?;
    Ok(Json(store))
}

pub async fn delete_upload(
    State(state): State<AppState>,
    Path((date, tag)): Path<(String, String)>,
) -> Result<StatusCode, HttpError> {
    daily_commands::remove_upload(&state, &date, &tag).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn cleanup_daily(
    State(state): State<AppState>,
    Query(query): Query<CleanupQuery>,
) -> Result<Json<CleanupOutcome>, HttpError> {
    let outcome = daily_commands::clean_daily_data(&state, query.retention_days).await?;
    Ok(Json(outcome))
}
