//! `SendLocalList` — always accepted; the local auth list isn't stored
//! beyond tracking the version for `GetLocalListVersion`.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use crate::protocol::dispatch::IncomingHandler;
use crate::protocol::error::ProtocolError;
use crate::session::vcp_session::VcpSession;

pub struct SendLocalList;

#[async_trait]
impl IncomingHandler for SendLocalList {
    async fn handle(&self, session: &VcpSession, payload: Value) -> Result<Value, ProtocolError> {
        let list_version = payload.get("listVersion").and_then(|v| v.as_i64()).unwrap_or(0) as i32;
        info!(cp_id = session.cp_id(), list_version, "SendLocalList");

        let runtime = session.runtime();
        let mut guard = runtime.lock().await;
        guard.local_list_version = list_version;

        Ok(json!({ "status": "Accepted" }))
    }
}
