//! `UnlockConnector` — always reports `Unlocked`.

use async_trait::async_trait;
use rust_ocpp::v1_6::messages::unlock_connector::UnlockConnectorRequest;
use serde_json::{json, Value};
use tracing::info;

use crate::protocol::dispatch::IncomingHandler;
use crate::protocol::error::ProtocolError;
use crate::session::vcp_session::VcpSession;

pub struct UnlockConnector;

#[async_trait]
impl IncomingHandler for UnlockConnector {
    async fn handle(&self, session: &VcpSession, payload: Value) -> Result<Value, ProtocolError> {
        let request: UnlockConnectorRequest = serde_json::from_value(payload)
            .map_err(|e| ProtocolError::SchemaValidation(e.to_string()))?;
        info!(cp_id = session.cp_id(), connector_id = request.connector_id, "UnlockConnector");
        Ok(json!({ "status": "Unlocked" }))
    }
}
