//! `CancelReservation` — always accepted.

use async_trait::async_trait;
use rust_ocpp::v1_6::messages::cancel_reservation::CancelReservationRequest;
use serde_json::{json, Value};
use tracing::info;

use crate::protocol::dispatch::IncomingHandler;
use crate::protocol::error::ProtocolError;
use crate::session::vcp_session::VcpSession;

pub struct CancelReservation;

#[async_trait]
impl IncomingHandler for CancelReservation {
    async fn handle(&self, session: &VcpSession, payload: Value) -> Result<Value, ProtocolError> {
        let request: CancelReservationRequest =
            serde_json::from_value(payload).map_err(|e| ProtocolError::SchemaValidation(e.to_string()))?;
        info!(cp_id = session.cp_id(), reservation_id = request.reservation_id, "CancelReservation");
        Ok(json!({ "status": "Accepted" }))
    }
}
