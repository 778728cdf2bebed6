//! `GetLocalListVersion` — reports whatever version `SendLocalList` last
//! stored (0 if none has ever landed).

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use crate::protocol::dispatch::IncomingHandler;
use crate::protocol::error::ProtocolError;
use crate::session::vcp_session::VcpSession;

pub struct GetLocalListVersion;

#[async_trait]
impl IncomingHandler for GetLocalListVersion {
    async fn handle(&self, session: &VcpSession, _payload: Value) -> Result<Value, ProtocolError> {
        let list_version = {
            let runtime = session.runtime();
            let guard = runtime.lock().await;
            guard.local_list_version
        };
        info!(cp_id = session.cp_id(), list_version, "GetLocalListVersion");
        Ok(json!({ "listVersion": list_version }))
    }
}
