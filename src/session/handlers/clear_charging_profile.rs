//! `ClearChargingProfile` — accepted; nothing is actually stored to clear.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use crate::protocol::dispatch::IncomingHandler;
use crate::protocol::error::ProtocolError;
use crate::session::vcp_session::VcpSession;

pub struct ClearChargingProfile;

#[async_trait]
impl IncomingHandler for ClearChargingProfile {
    async fn handle(&self, session: &VcpSession, payload: Value) -> Result<Value, ProtocolError> {
        info!(cp_id = session.cp_id(), ?payload, "ClearChargingProfile");
        Ok(json!({ "status": "Accepted" }))
    }
}
