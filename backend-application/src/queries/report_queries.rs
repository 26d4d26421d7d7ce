use std::path::PathBuf;

use backend_domain::{
    active_member_ids, attach_scores, build_dashboard, summarize, today, ActivityReport,
    DashboardView, RangeQuery,
};

use crate::queries::daily_queries::resolve_range;
use crate::{AppError, AppState};

pub async fn activity_report(
    state: &AppState,
    query: RangeQuery,
) -> Result<ActivityReport, AppError> {
    let store = state.daily_repo.load().await.map_err(AppError::Internal)?;
    let (start, end) = resolve_range(&store, &query)?;
    let roster = state.roster.read().await;
    let active = query.active_only.then(|| active_member_ids(&roster));
    let mut report = summarize(&store, start, end, active.as_ref());
    attach_scores(&mut report, &roster, today());
    Ok(report)
}

pub async fn dashboard(state: &AppState) -> Result<DashboardView, AppError> {
    let store = state.daily_repo.load().await.map_err(AppError::Internal)?;
    let members = state.roster.read().await;
    Ok(build_dashboard(
        &store,
        &members,
        today(),
        &state.config.activity,
    ))
}

pub async fn html_report(state: &AppState, query: RangeQuery) -> Result<String, AppError> {
    let report = activity_report(state, query).await?;
    Ok(state.report_publisher.render_html(&report))
}

/// Renders the report and writes it under the configured report directory.
pub async fn publish_report(state: &AppState, query: RangeQuery) -> Result<PathBuf, AppError> {
    let report = activity_report(state, query).await?;
    state
        .report_publisher
        .publish(&report)
        .await
        .map_err(AppError::Internal)
}
