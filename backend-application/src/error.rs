use backend_domain::LookupError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
