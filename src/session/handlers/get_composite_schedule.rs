//! `GetCompositeSchedule` — accepted with an empty schedule; this
//! simulator never builds or enforces charging schedules.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use crate::protocol::dispatch::IncomingHandler;
use crate::protocol::error::ProtocolError;
use crate::session::vcp_session::VcpSession;

pub struct GetCompositeSchedule;

#[async_trait]
impl IncomingHandler for GetCompositeSchedule {
    async fn handle(&self, session: &VcpSession, payload: Value) -> Result<Value, ProtocolError> {
        let connector_id = payload.get("connectorId").and_then(|v| v.as_i64()).unwrap_or(0);
        info!(cp_id = session.cp_id(), connector_id, "GetCompositeSchedule");
        Ok(json!({
            "status": "Accepted",
            "connectorId": connector_id,
        }))
    }
}
