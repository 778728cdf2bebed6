//! `ReserveNow` — always accepted; the reservation itself isn't enforced.

use async_trait::async_trait;
use rust_ocpp::v1_6::messages::reserve_now::ReserveNowRequest;
use serde_json::{json, Value};
use tracing::info;

use crate::charger::connector::ConnectorStatus;
use crate::protocol::dispatch::IncomingHandler;
use crate::protocol::error::ProtocolError;
use crate::session::flow::set_connector_status;
use crate::session::vcp_session::VcpSession;

pub struct ReserveNow;

#[async_trait]
impl IncomingHandler for ReserveNow {
    async fn handle(&self, session: &VcpSession, payload: Value) -> Result<Value, ProtocolError> {
        let request: ReserveNowRequest =
            serde_json::from_value(payload).map_err(|e| ProtocolError::SchemaValidation(e.to_string()))?;
        info!(
            cp_id = session.cp_id(),
            connector_id = request.connector_id,
            reservation_id = request.reservation_id,
            "ReserveNow"
        );
        set_connector_status(
            session,
            request.connector_id,
            ConnectorStatus::Reserved,
            rust_ocpp::v1_6::types::ChargePointErrorCode::NoError,
        )
        .await;
        Ok(json!({ "status": "Accepted" }))
    }
}
