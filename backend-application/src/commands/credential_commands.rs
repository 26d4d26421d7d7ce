use tracing::info;

use crate::{AppError, AppState};

/// Replaces the in-memory backoffice credential. It is never persisted.
pub async fn rotate_backoffice_token(state: &AppState, token: &str) -> Result<(), AppError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::BadRequest("token must not be empty".to_string()));
    }
    *state.backoffice_token.write().await = Some(token.to_string());
    info!("backoffice credential rotated");
    Ok(())
}

pub async fn has_backoffice_token(state: &AppState) -> bool {
    state.backoffice_token.read().await.is_some()
}
