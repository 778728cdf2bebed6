//! `ChangeAvailability` — moves a connector (or the whole charge point,
//! for `connectorId = 0`) to `Unavailable`/`Available` and responds
//! `Accepted`.

use async_trait::async_trait;
use rust_ocpp::v1_6::types::ChargePointErrorCode;
use serde_json::{json, Value};
use tracing::info;

use crate::charger::connector::ConnectorStatus;
use crate::protocol::dispatch::IncomingHandler;
use crate::protocol::error::ProtocolError;
use crate::session::flow::set_connector_status;
use crate::session::vcp_session::VcpSession;

pub struct ChangeAvailability;

#[async_trait]
impl IncomingHandler for ChangeAvailability {
    async fn handle(&self, session: &VcpSession, payload: Value) -> Result<Value, ProtocolError> {
        let connector_id = payload
            .get("connectorId")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| ProtocolError::SchemaValidation("ChangeAvailability missing connectorId".to_string()))?
            as u32;
        let kind = payload.get("type").and_then(|v| v.as_str()).unwrap_or("Operative");
        let status = if kind == "Inoperative" { ConnectorStatus::Unavailable } else { ConnectorStatus::Available };

        info!(cp_id = session.cp_id(), connector_id, kind, "ChangeAvailability");

        set_connector_status(session, connector_id, status, ChargePointErrorCode::NoError).await;

        Ok(json!({ "status": "Accepted" }))
    }
}
