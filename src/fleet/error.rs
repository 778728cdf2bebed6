//! Errors surfaced at the admin-command boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("charge point not found: {0}")]
    NotFound(String),

    #[error("charge point already exists: {0}")]
    Conflict(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
