use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use backend_application::commands::roster_commands;
use backend_application::queries::roster_queries;
use backend_application::AppState;
use backend_domain::{
    AddMemberRequest, BulkAddReport, BulkAddRequest, Member, MemberListQuery, MemberView,
    RefreshAllReport,
};

use crate::error::HttpError;

#[derive(Serialize)]
pub struct ToggleResponse {
    pub member_id: String,
    pub is_active: bool,
}

pub async fn list_members(
    State(state): State<AppState>,
    Query(query): Query<MemberListQuery>,
) -> Json<Vec<MemberView>> {
    Json(roster_queries::list_members(&state, query).await)
}

pub async fn get_member(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
) -> Result<Json<MemberView>, HttpError> {
    let member = roster_queries::get_member(&state, &member_id).await?;
    Ok(Json(member))
}

/// 201 when the member was added, 200 when it was already on the roster.
pub async fn add_member(
    State(state): State<AppState>,
    Json(payload): Json<AddMemberRequest>,
) -> Result<StatusCode, HttpError> {
    let added = roster_commands::add_member(&state, payload).await?;
    Ok(if added {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    })
}

pub async fn add_members_bulk(
    State(state): State<AppState>,
    Json(payload): Json<BulkAddRequest>,
) -> Result<Json<BulkAddReport>, HttpError> {
    let report = roster_commands::add_members_bulk(&state, payload).await?;
    Ok(Json(report))
}

pub async fn delete_member(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
) -> Result<StatusCode, HttpError> {
    roster_commands::delete_member(&state, &member_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_member(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
) -> Result<Json<ToggleResponse>, HttpError> {
    let is_active = roster_commands::toggle_member(&state, &member_id).await?;
    Ok(Json(ToggleResponse {
        member_id,
        is_active,
    }))
}

pub async fn refresh_member(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
) -> Result<Json<Member>, HttpError> {
    let member = roster_commands::refresh_member(&state, &member_id).await?;
    Ok(Json(member))
}

pub async fn refresh_all_members(
    State(state): State<AppState>,
) -> Result<Json<RefreshAllReport>, HttpError> {
    let report = roster_commands::refresh_all_members(&state).await?;
    Ok(Json(report))
}
