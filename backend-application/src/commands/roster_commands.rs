use std::collections::HashSet;

use tokio::sync::RwLockWriteGuard;
use tracing::{info, warn};

use backend_domain::{
    find_member, is_valid_member_id, now_local, split_member_ids, today, AddMemberRequest,
    BulkAddReport, BulkAddRequest, DiscoveredMember, LookupError, Member, MemberProfile,
    RefreshAllReport,
};

use crate::commands::sync_commands;
use crate::{AppError, AppState};

pub(crate) async fn lookup_profile(
    state: &AppState,
    member_id: &str,
) -> Result<MemberProfile, LookupError> {
    let token = state.backoffice_token.read().await.clone();
    let result = state
        .profile_lookup
        .fetch_profile(member_id, token.as_deref())
        .await;
    state.metrics.record_lookup(result.is_ok());
    result
}

/// Saves the next roster and swaps it into the cache only once the save
/// succeeded. The lock is released before the remote push.
async fn commit(
    state: &AppState,
    mut roster: RwLockWriteGuard<'_, Vec<Member>>,
    next: Vec<Member>,
) -> Result<(), AppError> {
    state
        .roster_repo
        .save(&next)
        .await
        .map_err(AppError::Internal)?;
    *roster = next;
    drop(roster);
    sync_commands::auto_sync(state).await;
    Ok(())
}

fn validate_member_id(member_id: &str) -> Result<String, AppError> {
    let trimmed = member_id.trim();
    if !is_valid_member_id(trimmed) {
        return Err(AppError::BadRequest(format!(
            "invalid member_id '{}': expected at least 6 digits",
            trimmed
        )));
    }
    Ok(trimmed.to_string())
}

/// Adds one member and enriches it from the backoffice. Returns `false`
/// when the id is already on the roster. A failed lookup keeps the member.
pub async fn add_member(state: &AppState, request: AddMemberRequest) -> Result<bool, AppError> {
    let member_id = validate_member_id(&request.member_id)?;
    if find_member(&state.roster.read().await, &member_id).is_some() {
        return Ok(false);
    }

    let mut member = Member::new(
        member_id.clone(),
        request.username.trim(),
        request.full_name.trim(),
        now_local(),
    );
    match lookup_profile(state, &member_id).await {
        Ok(profile) => member.apply_profile(&profile, today(), now_local()),
        Err(err) => warn!("member {} added without profile: {}", member_id, err),
    }

    let roster = state.roster.write().await;
    if find_member(&roster, &member_id).is_some() {
        return Ok(false);
    }
    let mut next = roster.clone();
    next.push(member);
    commit(state, roster, next).await?;
    info!("member {} added", member_id);
    Ok(true)
}

/// Adds every id whose backoffice lookup returns a username. Ids that are
/// invalid or cannot be looked up are reported as failed.
pub async fn add_members_bulk(
    state: &AppState,
    request: BulkAddRequest,
) -> Result<BulkAddReport, AppError> {
    let mut ids: Vec<String> = request
        .member_ids
        .iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();
    if let Some(text) = &request.text {
        ids.extend(split_member_ids(text));
    }
    if ids.is_empty() {
        return Err(AppError::BadRequest("no member ids given".to_string()));
    }

    let known: HashSet<String> = state
        .roster
        .read()
        .await
        .iter()
        .map(|member| member.member_id.clone())
        .collect();

    let mut report = BulkAddReport::default();
    let mut seen = HashSet::new();
    let mut added = Vec::new();
    for id in ids {
        if !seen.insert(id.clone()) {
            continue;
        }
        if known.contains(&id) {
            report.skipped_existing += 1;
            continue;
        }
        if !is_valid_member_id(&id) {
            report.failed.push(id);
            continue;
        }
        match lookup_profile(state, &id).await {
            Ok(profile) if profile.has_username() => {
                let mut member = Member::new(
                    id.clone(),
                    profile.username.clone(),
                    profile.full_name.clone(),
                    now_local(),
                );
                member.apply_profile(&profile, today(), now_local());
                added.push(member);
            }
            Ok(_) => {
                warn!("bulk add: profile for {} has no username", id);
                report.failed.push(id);
            }
            Err(err) => {
                warn!("bulk add: lookup for {} failed: {}", id, err);
                report.failed.push(id);
            }
        }
    }

    if !added.is_empty() {
        let roster = state.roster.write().await;
        let mut next = roster.clone();
        for member in added {
            if find_member(&next, &member.member_id).is_some() {
                report.skipped_existing += 1;
                continue;
            }
            next.push(member);
            report.added += 1;
        }
        commit(state, roster, next).await?;
    }
    info!(
        "bulk add finished: added={} failed={} skipped={}",
        report.added,
        report.failed.len(),
        report.skipped_existing
    );
    Ok(report)
}

/// Adds members discovered in an upload, using the names carried by the
/// upload row. Lookup failures never block the add.
pub async fn add_discovered_members(
    state: &AppState,
    discovered: &[DiscoveredMember],
) -> Result<usize, AppError> {
    let mut prepared = Vec::new();
    for candidate in discovered {
        let mut member = Member::new(
            candidate.member_id.clone(),
            candidate.username.clone(),
            candidate.customer_name.clone(),
            now_local(),
        );
        match lookup_profile(state, &candidate.member_id).await {
            Ok(profile) => member.apply_profile(&profile, today(), now_local()),
            Err(err) => warn!(
                "discovered member {} added without profile: {}",
                candidate.member_id, err
            ),
        }
        prepared.push(member);
    }

    let roster = state.roster.write().await;
    let mut next = roster.clone();
    let mut added = 0;
    for member in prepared {
        if find_member(&next, &member.member_id).is_none() {
            next.push(member);
            added += 1;
        }
    }
    if added > 0 {
        commit(state, roster, next).await?;
    }
    Ok(added)
}

pub async fn toggle_member(state: &AppState, member_id: &str) -> Result<bool, AppError> {
    let roster = state.roster.write().await;
    let mut next = roster.clone();
    let member = next
        .iter_mut()
        .find(|member| member.member_id == member_id)
        .ok_or_else(|| AppError::NotFound(format!("member {}", member_id)))?;
    let active = member.toggle_active(now_local());
    commit(state, roster, next).await?;
    Ok(active)
}

pub async fn delete_member(state: &AppState, member_id: &str) -> Result<(), AppError> {
    let roster = state.roster.write().await;
    if find_member(&roster, member_id).is_none() {
        return Err(AppError::NotFound(format!("member {}", member_id)));
    }
    let next = roster
        .iter()
        .filter(|member| member.member_id != member_id)
        .cloned()
        .collect();
    commit(state, roster, next).await?;
    info!("member {} deleted", member_id);
    Ok(())
}

/// Re-fetches one member's profile and recomputes its derived fields.
pub async fn refresh_member(state: &AppState, member_id: &str) -> Result<Member, AppError> {
    if find_member(&state.roster.read().await, member_id).is_none() {
        return Err(AppError::NotFound(format!("member {}", member_id)));
    }
    let profile = lookup_profile(state, member_id).await?;

    let roster = state.roster.write().await;
    let mut next = roster.clone();
    let member = next
        .iter_mut()
        .find(|member| member.member_id == member_id)
        .ok_or_else(|| AppError::NotFound(format!("member {}", member_id)))?;
    member.apply_profile(&profile, today(), now_local());
    let refreshed = member.clone();
    commit(state, roster, next).await?;
    Ok(refreshed)
}

/// Refreshes every active member one after the other.
pub async fn refresh_all_members(state: &AppState) -> Result<RefreshAllReport, AppError> {
    let ids: Vec<String> = state
        .roster
        .read()
        .await
        .iter()
        .filter(|member| member.is_active)
        .map(|member| member.member_id.clone())
        .collect();

    let mut report = RefreshAllReport::default();
    let mut profiles = Vec::new();
    for id in ids {
        match lookup_profile(state, &id).await {
            Ok(profile) => profiles.push((id, profile)),
            Err(err) => {
                warn!("refresh of {} failed: {}", id, err);
                report.failed.push(id);
            }
        }
    }

    if !profiles.is_empty() {
        let roster = state.roster.write().await;
        let mut next = roster.clone();
        let (today, now) = (today(), now_local());
        for (id, profile) in &profiles {
            if let Some(member) = next.iter_mut().find(|member| &member.member_id == id) {
                member.apply_profile(profile, today, now);
                report.refreshed += 1;
            }
        }
        commit(state, roster, next).await?;
    }
    info!(
        "profile refresh finished: refreshed={} failed={}",
        report.refreshed,
        report.failed.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::test_support::{member, FakeLookup, MemoryRemote, MemoryRosterRepo, TestStateBuilder};
    use backend_domain::{RuntimeConfig, UNKNOWN_DAYS};

    fn add_request(id: &str) -> AddMemberRequest {
        AddMemberRequest {
            member_id: id.to_string(),
            username: String::new(),
            full_name: String::new(),
        }
    }

    #[tokio::test]
    async fn add_member_enriches_and_skips_duplicates() {
        let roster_repo = Arc::new(MemoryRosterRepo::default());
        let state = TestStateBuilder {
            roster: roster_repo.clone(),
            lookup: FakeLookup::default().with_profile("303364529", "ahmet"),
            ..TestStateBuilder::default()
        }
        .build();

        assert!(add_member(&state, add_request(" 303364529 ")).await.expect("add"));
        assert!(!add_member(&state, add_request("303364529")).await.expect("add again"));

        let saved = roster_repo.members.lock().await.clone();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].username, "ahmet");
        assert!(saved[0].is_active);
        assert!(saved[0].profile_data.is_some());
        assert_eq!(state.roster.read().await.len(), 1);
    }

    #[tokio::test]
    async fn add_member_survives_lookup_failure() {
        let state = TestStateBuilder {
            lookup: FakeLookup::default().with_error("303364529", LookupError::Unauthorized),
            ..TestStateBuilder::default()
        }
        .build();

        let request = AddMemberRequest {
            member_id: "303364529".to_string(),
            username: "manual".to_string(),
            full_name: "Manual Name".to_string(),
        };
        assert!(add_member(&state, request).await.expect("add"));
        let roster = state.roster.read().await;
        assert_eq!(roster[0].username, "manual");
        assert_eq!(roster[0].days_without_deposit, UNKNOWN_DAYS);
        assert!(roster[0].profile_data.is_none());
    }

    #[tokio::test]
    async fn add_member_rejects_malformed_ids() {
        let state = TestStateBuilder::default().build();
        for id in ["12345", "abc123456", ""] {
            let err = add_member(&state, add_request(id)).await.expect_err("invalid");
            assert!(matches!(err, AppError::BadRequest(_)));
        }
    }

    #[tokio::test]
    async fn bulk_add_reports_partial_failure() {
        let state = TestStateBuilder {
            lookup: FakeLookup::default().with_profile("111111", "first"),
            members: vec![member("333333")],
            ..TestStateBuilder::default()
        }
        .build();

        let request = BulkAddRequest {
            member_ids: vec!["111111".to_string(), "222222".to_string()],
            text: Some("333333\n111111; 12ab".to_string()),
        };
        let report = add_members_bulk(&state, request).await.expect("bulk");
        assert_eq!(report.added, 1);
        assert_eq!(report.failed, vec!["222222".to_string(), "12ab".to_string()]);
        assert_eq!(report.skipped_existing, 1);

        let roster = state.roster.read().await;
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[1].member_id, "111111");
        assert_eq!(roster[1].username, "first");
    }

    #[tokio::test]
    async fn bulk_add_without_credential_fails_every_id() {
        let state = TestStateBuilder {
            lookup: FakeLookup::default().with_profile("111111", "first"),
            token: None,
            ..TestStateBuilder::default()
        }
        .build();
        let request = BulkAddRequest {
            member_ids: vec!["111111".to_string()],
            text: None,
        };
        let report = add_members_bulk(&state, request).await.expect("bulk");
        assert_eq!(report.added, 0);
        assert_eq!(report.failed.len(), 1);
        assert!(state.roster.read().await.is_empty());
    }

    #[tokio::test]
    async fn toggle_flips_and_persists() {
        let roster_repo = Arc::new(MemoryRosterRepo::default());
        let state = TestStateBuilder {
            roster: roster_repo.clone(),
            members: vec![member("111111")],
            ..TestStateBuilder::default()
        }
        .build();

        assert!(!toggle_member(&state, "111111").await.expect("toggle"));
        assert!(!roster_repo.members.lock().await[0].is_active);
        assert!(state.roster.read().await[0].updated_at.is_some());

        let err = toggle_member(&state, "999999").await.expect_err("unknown");
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn roster_saves_push_to_remote_when_auto_sync_is_on() {
        let remote = Arc::new(MemoryRemote::default());
        let mut config = RuntimeConfig::default();
        config.auto_sync = true;
        let state = TestStateBuilder {
            config,
            remote: Some(remote.clone()),
            members: vec![member("111111"), member("222222")],
            ..TestStateBuilder::default()
        }
        .build();

        toggle_member(&state, "111111").await.expect("toggle");
        let pushed: Vec<Member> = {
            let files = remote.files.lock().await;
            assert!(files.contains_key("daily_data.json"));
            serde_json::from_slice(&files["members.json"]).expect("members")
        };
        assert!(!pushed[0].is_active);

        delete_member(&state, "222222").await.expect("delete");
        let files = remote.files.lock().await;
        let pushed: Vec<Member> = serde_json::from_slice(&files["members.json"]).expect("members");
        assert_eq!(pushed.len(), 1);
        assert_eq!(pushed[0].member_id, "111111");
    }

    #[tokio::test]
    async fn roster_saves_stay_local_when_auto_sync_is_off() {
        let remote = Arc::new(MemoryRemote::default());
        let state = TestStateBuilder {
            remote: Some(remote.clone()),
            members: vec![member("111111")],
            ..TestStateBuilder::default()
        }
        .build();

        toggle_member(&state, "111111").await.expect("toggle");
        assert!(remote.files.lock().await.is_empty());
    }

    #[tokio::test]
    async fn failed_save_leaves_cache_untouched() {
        let state = TestStateBuilder {
            roster: Arc::new(MemoryRosterRepo {
                fail_saves: true,
                ..MemoryRosterRepo::default()
            }),
            members: vec![member("111111")],
            ..TestStateBuilder::default()
        }
        .build();

        let err = delete_member(&state, "111111").await.expect_err("save fails");
        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(state.roster.read().await.len(), 1);
    }

    #[tokio::test]
    async fn refresh_member_maps_lookup_errors() {
        let lookup = FakeLookup::default()
            .with_profile("111111", "first")
            .with_error("222222", LookupError::Unauthorized);
        let calls = lookup.calls.clone();
        let state = TestStateBuilder {
            lookup,
            members: vec![member("111111"), member("222222")],
            ..TestStateBuilder::default()
        }
        .build();

        let refreshed = refresh_member(&state, "111111").await.expect("refresh");
        assert_eq!(refreshed.days_without_deposit, 3);
        assert!(refreshed.last_profile_update.is_some());

        let err = refresh_member(&state, "222222").await.expect_err("unauthorized");
        assert!(matches!(err, AppError::Lookup(LookupError::Unauthorized)));
        let err = refresh_member(&state, "333333").await.expect_err("unknown");
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(*calls.lock().await, vec!["111111".to_string(), "222222".to_string()]);
    }

    #[tokio::test]
    async fn refresh_all_skips_inactive_and_counts_failures() {
        let mut inactive = member("333333");
        inactive.is_active = false;
        let lookup = FakeLookup::default()
            .with_profile("111111", "first")
            .with_profile("333333", "third");
        let calls = lookup.calls.clone();
        let state = TestStateBuilder {
            lookup,
            members: vec![member("111111"), member("222222"), inactive],
            ..TestStateBuilder::default()
        }
        .build();

        let report = refresh_all_members(&state).await.expect("refresh all");
        assert_eq!(report.refreshed, 1);
        assert_eq!(report.failed, vec!["222222".to_string()]);
        assert!(state.roster.read().await[2].last_profile_update.is_none());
        assert_eq!(*calls.lock().await, vec!["111111".to_string(), "222222".to_string()]);
    }

    #[tokio::test]
    async fn discovered_members_are_added_without_profiles() {
        let state = TestStateBuilder {
            members: vec![member("111111")],
            ..TestStateBuilder::default()
        }
        .build();
        let discovered = vec![
            DiscoveredMember {
                member_id: "111111".to_string(),
                username: "dup".to_string(),
                customer_name: String::new(),
            },
            DiscoveredMember {
                member_id: "222222".to_string(),
                username: "new".to_string(),
                customer_name: "New Person".to_string(),
            },
        ];
        let added = add_discovered_members(&state, &discovered).await.expect("add");
        assert_eq!(added, 1);
        let roster = state.roster.read().await;
        assert_eq!(roster[1].username, "new");
        assert_eq!(roster[1].full_name, "New Person");
    }
}
