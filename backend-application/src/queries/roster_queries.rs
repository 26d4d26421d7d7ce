use backend_domain::{filter_members, find_member, today, MemberListQuery, MemberView};

use crate::{AppError, AppState};

pub async fn list_members(state: &AppState, query: MemberListQuery) -> Vec<MemberView> {
    let members = state.roster.read().await;
    filter_members(&members, &query, &state.config.activity, today())
}

pub async fn get_member(state: &AppState, member_id: &str) -> Result<MemberView, AppError> {
    let members = state.roster.read().await;
    find_member(&members, member_id)
        .cloned()
        .map(|member| MemberView::new(member, &state.config.activity, today()))
        .ok_or_else(|| AppError::NotFound(format!("member {}", member_id)))
}
