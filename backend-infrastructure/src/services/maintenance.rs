use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use tracing::{error, info, warn};

use backend_application::commands::daily_commands;
use backend_application::AppState;

/// Runs the retention cleanup once a day at the configured local time.
/// Returns immediately when no retention window is configured.
pub async fn schedule_maintenance(state: AppState) {
    let Some(retention_days) = state.config.retention_days else {
        info!("retention cleanup disabled");
        return;
    };
    loop {
        let Some(next) = next_cleanup_time(Local::now(), state.config.cleanup_hour, state.config.cleanup_minute)
        else {
            warn!(
                "invalid cleanup time {:02}:{:02}, scheduler stopped",
                state.config.cleanup_hour, state.config.cleanup_minute
            );
            return;
        };
        let sleep_ms = next.signed_duration_since(Local::now()).num_milliseconds().max(0) as u64;
        tokio::time::sleep(Duration::from_millis(sleep_ms)).await;

        match daily_commands::clean_daily_data(&state, Some(retention_days)).await {
            Ok(outcome) => info!(
                "scheduled cleanup removed {} date(s)",
                outcome.removed_dates.len()
            ),
            Err(err) => error!("scheduled cleanup failed: {}", err),
        }
    }
}

fn at_local(date: NaiveDate, hour: u32, minute: u32) -> Option<DateTime<Local>> {
    let target = date.and_hms_opt(hour, minute, 0)?;
    Local.from_local_datetime(&target).earliest()
}

/// Next occurrence of `hour:minute` strictly after `now`.
pub fn next_cleanup_time(now: DateTime<Local>, hour: u32, minute: u32) -> Option<DateTime<Local>> {
    let today = now.date_naive();
    match at_local(today, hour, minute) {
        Some(dt) if dt > now => Some(dt),
        _ => at_local(today.succ_opt()?, hour, minute),
    }
}
