//! `DataTransfer` (Incoming) — always accepted, no application payload.

use async_trait::async_trait;
use rust_ocpp::v1_6::messages::data_transfer::DataTransferRequest;
use serde_json::{json, Value};
use tracing::info;

use crate::protocol::dispatch::IncomingHandler;
use crate::protocol::error::ProtocolError;
use crate::session::vcp_session::VcpSession;

pub struct DataTransfer;

#[async_trait]
impl IncomingHandler for DataTransfer {
    async fn handle(&self, session: &VcpSession, payload: Value) -> Result<Value, ProtocolError> {
        let request: DataTransferRequest = serde_json::from_value(payload)
            .map_err(|e| ProtocolError::SchemaValidation(e.to_string()))?;
        info!(
            cp_id = session.cp_id(),
            vendor_id = request.vendor_string.as_str(),
            message_id = ?request.message_id,
            "DataTransfer"
        );
        Ok(json!({ "status": "Accepted" }))
    }
}
