use axum::extract::{Query, State};
use axum::response::Html;
use axum::Json;

use backend_application::queries::report_queries;
use backend_application::AppState;
use backend_domain::{ActivityReport, DashboardView, RangeQuery};

use crate::error::HttpError;

pub async fn report_summary(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ActivityReport>, HttpError> {
    let report = report_queries::activity_report(&state, query).await?;
    Ok(Json(report))
}

pub async fn report_dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardView>, HttpError> {
    let view = report_queries::dashboard(&state).await?;
    Ok(Json(view))
}

pub async fn report_html(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Html<String>, HttpError> {
    let html = report_queries::html_report(&state, query).await?;
    Ok(Html(html))
}
