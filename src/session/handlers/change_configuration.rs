//! `ChangeConfiguration` — accepts known, writable keys; rejects anything
//! else with `NotSupported`.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use crate::protocol::dispatch::IncomingHandler;
use crate::protocol::error::ProtocolError;
use crate::session::vcp_session::VcpSession;

pub struct ChangeConfiguration;

#[async_trait]
impl IncomingHandler for ChangeConfiguration {
    async fn handle(&self, session: &VcpSession, payload: Value) -> Result<Value, ProtocolError> {
        let key = payload
            .get("key")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ProtocolError::SchemaValidation("ChangeConfiguration missing key".to_string()))?
            .to_string();
        let value = payload
            .get("value")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ProtocolError::SchemaValidation("ChangeConfiguration missing value".to_string()))?
            .to_string();

        let runtime = session.runtime();
        let mut guard = runtime.lock().await;
        let status = match guard.config_table.set(&key, value.clone()) {
            Ok(()) => "Accepted",
            Err(()) => "NotSupported",
        };
        info!(cp_id = session.cp_id(), key, value, status, "ChangeConfiguration");

        Ok(json!({ "status": status }))
    }
}
