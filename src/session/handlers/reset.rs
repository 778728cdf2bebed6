//! `Reset` — always accepted, then the session closes as if rebooting.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use crate::protocol::dispatch::IncomingHandler;
use crate::protocol::error::ProtocolError;
use crate::session::vcp_session::VcpSession;

pub struct Reset;

#[async_trait]
impl IncomingHandler for Reset {
    async fn handle(&self, session: &VcpSession, payload: Value) -> Result<Value, ProtocolError> {
        let kind = payload.get("type").and_then(|v| v.as_str()).unwrap_or("Soft").to_string();
        info!(cp_id = session.cp_id(), kind, "Reset requested");

        let session = session.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            session.close();
        });

        Ok(json!({ "status": "Accepted" }))
    }
}
