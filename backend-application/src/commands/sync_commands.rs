use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use backend_domain::ports::RemoteFileStore;
use backend_domain::{now_local, DailyStore, Member, SyncOutcome};

use crate::{AppError, AppState};

fn remote_store(state: &AppState) -> Result<&Arc<dyn RemoteFileStore>, AppError> {
    state
        .remote_store
        .as_ref()
        .ok_or_else(|| AppError::BadRequest("remote store is not configured".to_string()))
}

/// Pushes the daily store and the roster to the remote file store.
pub async fn push_to_remote(state: &AppState) -> Result<SyncOutcome, AppError> {
    let remote = remote_store(state)?;
    let store = state.daily_repo.load().await.map_err(AppError::Internal)?;
    let members = state.roster.read().await.clone();
    let stamp = now_local().format("%Y-%m-%d %H:%M:%S");

    let result = async {
        let daily = serde_json::to_vec_pretty(&store).context("serialize daily store")?;
        remote
            .put(
                &state.config.remote_daily_path,
                &daily,
                &format!("Update daily data - {}", stamp),
            )
            .await?;
        let roster = serde_json::to_vec_pretty(&members).context("serialize roster")?;
        remote
            .put(
                &state.config.remote_members_path,
                &roster,
                &format!("Update members - {}", stamp),
            )
            .await?;
        anyhow::Ok(())
    }
    .await;
    state.metrics.record_remote_sync(result.is_ok());
    result.map_err(AppError::Internal)?;

    info!("pushed {} days and {} members to {}", store.day_count(), members.len(), remote.describe());
    Ok(SyncOutcome {
        files: vec![
            state.config.remote_daily_path.clone(),
            state.config.remote_members_path.clone(),
        ],
        day_count: store.day_count(),
        member_count: members.len(),
    })
}

/// Restores local files from the remote store. A file missing remotely
/// leaves its local counterpart untouched.
pub async fn pull_from_remote(state: &AppState) -> Result<SyncOutcome, AppError> {
    let remote = remote_store(state)?;
    let mut outcome = SyncOutcome {
        files: Vec::new(),
        day_count: 0,
        member_count: 0,
    };

    let daily_bytes = remote
        .get(&state.config.remote_daily_path)
        .await
        .map_err(AppError::Internal)?;
    let members_bytes = remote
        .get(&state.config.remote_members_path)
        .await
        .map_err(AppError::Internal)?;

    // Parse both before writing either.
    let store = daily_bytes
        .map(|bytes| serde_json::from_slice::<DailyStore>(&bytes))
        .transpose()
        .context("remote daily store is not valid")
        .map_err(AppError::Internal)?;
    let members = members_bytes
        .map(|bytes| serde_json::from_slice::<Vec<Member>>(&bytes))
        .transpose()
        .context("remote roster is not valid")
        .map_err(AppError::Internal)?;

    if let Some(store) = store {
        state
            .daily_repo
            .replace_all(&store)
            .await
            .map_err(AppError::Internal)?;
        outcome.day_count = store.day_count();
        outcome.files.push(state.config.remote_daily_path.clone());
    }
    if let Some(members) = members {
        let mut roster = state.roster.write().await;
        state
            .roster_repo
            .save(&members)
            .await
            .map_err(AppError::Internal)?;
        outcome.member_count = members.len();
        *roster = members;
        outcome.files.push(state.config.remote_members_path.clone());
    }
    state.metrics.record_remote_sync(true);
    info!("restored {:?} from {}", outcome.files, remote.describe());
    Ok(outcome)
}

/// Best-effort push after a local save when `auto_sync` is enabled.
pub async fn auto_sync(state: &AppState) {
    if !state.config.auto_sync || state.remote_store.is_none() {
        return;
    }
    if let Err(err) = push_to_remote(state).await {
        warn!("auto sync failed: {}", err);
    }
}
