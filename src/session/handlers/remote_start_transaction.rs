//! `RemoteStartTransaction` — always accepted; the Authorize/StartTransaction
//! handshake (`session::flow::start_transaction`) runs in the background.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::protocol::dispatch::IncomingHandler;
use crate::protocol::error::ProtocolError;
use crate::session::flow;
use crate::session::vcp_session::VcpSession;

pub struct RemoteStartTransaction;

#[async_trait]
impl IncomingHandler for RemoteStartTransaction {
    async fn handle(&self, session: &VcpSession, payload: Value) -> Result<Value, ProtocolError> {
        let id_tag = payload
            .get("idTag")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ProtocolError::SchemaValidation("RemoteStartTransaction missing idTag".to_string()))?
            .to_string();
        let connector_id = payload.get("connectorId").and_then(|v| v.as_u64()).unwrap_or(1) as u32;

        info!(cp_id = session.cp_id(), connector_id, id_tag, "RemoteStartTransaction");

        if let Err(e) = flow::start_transaction(session.clone(), connector_id, id_tag).await {
            warn!(cp_id = session.cp_id(), connector_id, error = %e, "RemoteStartTransaction flow not started");
        }

        Ok(json!({ "status": "Accepted" }))
    }
}
