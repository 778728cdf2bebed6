//! Top-level error aggregation.

use thiserror::Error;

use crate::fleet::error::AdminError;
use crate::protocol::error::ProtocolError;
use crate::session::error::SessionError;

/// Aggregate error type returned at the binary boundary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Admin(#[from] AdminError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
