use tracing::info;

use backend_domain::{parse_date, retention_cutoff, today, CleanupOutcome};

use crate::commands::sync_commands;
use crate::{AppError, AppState};

pub async fn remove_upload(state: &AppState, date: &str, tag: &str) -> Result<(), AppError> {
    let date = parse_date(date)
        .map_err(|_| AppError::BadRequest(format!("invalid date '{}', expected YYYY-MM-DD", date)))?;
    let removed = state
        .daily_repo
        .remove(date, tag)
        .await
        .map_err(AppError::Internal)?;
    if !removed {
        return Err(AppError::NotFound(format!("no upload for {} under tag {}", date, tag)));
    }
    info!("removed upload {} {}", date, tag);
    sync_commands::auto_sync(state).await;
    Ok(())
}

/// Drops dates older than the retention window. An explicit value wins
/// over the configured one.
pub async fn clean_daily_data(
    state: &AppState,
    retention_days: Option<u32>,
) -> Result<CleanupOutcome, AppError> {
    let retention_days = retention_days
        .or(state.config.retention_days)
        .ok_or_else(|| AppError::BadRequest("retention_days is required".to_string()))?;
    let today = today();
    let removed_dates = state
        .daily_repo
        .clean(retention_days, today)
        .await
        .map_err(AppError::Internal)?;
    state.metrics.record_cleanup(removed_dates.len());
    if !removed_dates.is_empty() {
        info!(
            "retention cleanup removed {} date(s) older than {} days",
            removed_dates.len(),
            retention_days
        );
        sync_commands::auto_sync(state).await;
    }
    Ok(CleanupOutcome {
        retention_days,
        cutoff: Some(retention_cutoff(today, retention_days)),
        removed_dates,
    })
}
