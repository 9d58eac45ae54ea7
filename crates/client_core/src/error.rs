use shared::{domain::UserId, error::FieldErrors};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("remote user source returned HTTP {status}")]
    Status { status: u16 },
    #[error("failed to reach remote user source: {0}")]
    Transport(String),
    #[error("remote user source returned an unreadable body: {0}")]
    Decode(String),
    #[error("remote user source is unavailable")]
    Unavailable,
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to fetch users: {0}")]
    Fetch(#[from] FetchError),
    #[error("failed to persist users: {0}")]
    Persist(String),
    #[error("failed to encode users: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("invalid user: {0}")]
    Validation(FieldErrors),
    #[error("user {0} not found")]
    NotFound(UserId),
    #[error("no user id left after {0}")]
    IdSpaceExhausted(UserId),
}

impl DirectoryError {
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            DirectoryError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}
