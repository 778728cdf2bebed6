//! Session-layer error kinds (outbound call lifecycle, transport).

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum SessionError {
    #[error("call timed out waiting for a response")]
    CallTimeout,

    #[error("CSMS returned CallError {error_code}: {error_description}")]
    CallError {
        error_code: String,
        error_description: String,
    },

    #[error("transport closed")]
    TransportClosed,

    #[error("failed to connect: {0}")]
    ConnectFailure(String),
}
