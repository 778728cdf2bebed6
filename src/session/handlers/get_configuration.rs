//! `GetConfiguration` — returns the charger's key/value table, echoing
//! any requested keys that don't exist in `unknownKey`.

use async_trait::async_trait;
use rust_ocpp::v1_6::messages::get_configuration::GetConfigurationRequest;
use serde_json::{json, Value};
use tracing::info;

use crate::protocol::dispatch::IncomingHandler;
use crate::protocol::error::ProtocolError;
use crate::session::vcp_session::VcpSession;

pub struct GetConfiguration;

#[async_trait]
impl IncomingHandler for GetConfiguration {
    async fn handle(&self, session: &VcpSession, payload: Value) -> Result<Value, ProtocolError> {
        let request: GetConfigurationRequest =
            serde_json::from_value(payload).map_err(|e| ProtocolError::SchemaValidation(e.to_string()))?;
        info!(cp_id = session.cp_id(), keys = ?request.key, "GetConfiguration");

        let runtime = session.runtime();
        let guard = runtime.lock().await;
        let (known, unknown) = guard.config_table.get(request.key.as_deref());

        let configuration_key: Vec<Value> = known
            .into_iter()
            .map(|(key, entry)| json!({ "key": key, "readonly": entry.readonly, "value": entry.value }))
            .collect();

        Ok(json!({
            "configurationKey": configuration_key,
            "unknownKey": unknown,
        }))
    }
}
