//! `SetChargingProfile` — accepted; charging schedules aren't enforced,
//! only the flat `offeredCurrentA` admin knob is.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use crate::protocol::dispatch::IncomingHandler;
use crate::protocol::error::ProtocolError;
use crate::session::vcp_session::VcpSession;

pub struct SetChargingProfile;

#[async_trait]
impl IncomingHandler for SetChargingProfile {
    async fn handle(&self, session: &VcpSession, payload: Value) -> Result<Value, ProtocolError> {
        let connector_id = payload.get("connectorId").and_then(|v| v.as_i64());
        info!(cp_id = session.cp_id(), ?connector_id, "SetChargingProfile");
        Ok(json!({ "status": "Accepted" }))
    }
}
