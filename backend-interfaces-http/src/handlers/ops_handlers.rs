use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use tokio::time::{timeout, Duration};
use tracing::error;

use backend_application::commands::{credential_commands, sync_commands};
use backend_application::AppState;
use backend_domain::{SyncOutcome, TokenRotationRequest};

use crate::error::HttpError;

pub async fn health_live() -> StatusCode {
    StatusCode::OK
}

pub async fn health_ready(State(state): State<AppState>) -> StatusCode {
    let timeout_secs = state.config.request_timeout_seconds.max(1);
    let timeout_duration = Duration::from_secs(timeout_secs);
    match timeout(timeout_duration, state.daily_repo.ping()).await {
        Ok(Ok(_)) => StatusCode::OK,
        Ok(Err(err)) => {
            error!("ready check failed: {:#}", err);
            StatusCode::SERVICE_UNAVAILABLE
        }
        Err(_) => {
            error!("ready check timeout after {}s", timeout_secs);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

pub async fn metrics_prometheus(State(state): State<AppState>) -> impl IntoResponse {
    let payload = state.metrics.render_prometheus();
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    (headers, payload)
}

pub async fn rotate_backoffice_token(
    State(state): State<AppState>,
    Json(payload): Json<TokenRotationRequest>,
) -> Result<StatusCode, HttpError> {
    credential_commands::rotate_backoffice_token(&state, &payload.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remote_push(State(state): State<AppState>) -> Result<Json<SyncOutcome>, HttpError> {
    let outcome = sync_commands::push_to_remote(&state).await?;
    Ok(Json(outcome))
}

pub async fn remote_pull(State(state): State<AppState>) -> Result<Json<SyncOutcome>, HttpError> {
    let outcome = sync_commands::pull_from_remote(&state).await?;
    Ok(Json(outcome))
}
