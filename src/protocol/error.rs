//! Protocol-layer error kinds (inbound parsing, validation, routing).

use thiserror::Error;

use crate::protocol::error_code::OcppErrorCode;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("schema validation failed: {0}")]
    SchemaValidation(String),

    #[error("protocol framing error: {0}")]
    ProtocolFraming(String),

    #[error("unknown action: {0}")]
    UnknownAction(String),
}

impl ProtocolError {
    /// Maps this error onto the OCPP error code carried in a CallError frame.
    pub fn error_code(&self) -> OcppErrorCode {
        match self {
            Self::SchemaValidation(_) => OcppErrorCode::FormatViolation,
            Self::ProtocolFraming(_) => OcppErrorCode::ProtocolError,
            Self::UnknownAction(_) => OcppErrorCode::NotImplemented,
        }
    }
}
