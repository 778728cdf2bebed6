//! `TriggerMessage` — accepted and immediately fulfilled for
//! `BootNotification`/`Heartbeat`/`StatusNotification`; anything else is
//! `NotImplemented`.

use async_trait::async_trait;
use rust_ocpp::v1_6::messages::trigger_message::TriggerMessageRequest;
use rust_ocpp::v1_6::types::{ChargePointErrorCode, MessageTrigger};
use serde_json::{json, Value};
use tracing::info;

use crate::charger::connector::ConnectorStatus;
use crate::protocol::dispatch::IncomingHandler;
use crate::protocol::envelope::OcppFrame;
use crate::protocol::error::ProtocolError;
use crate::session::messages;
use crate::session::vcp_session::VcpSession;

pub struct TriggerMessage;

#[async_trait]
impl IncomingHandler for TriggerMessage {
    async fn handle(&self, session: &VcpSession, payload: Value) -> Result<Value, ProtocolError> {
        let request: TriggerMessageRequest =
            serde_json::from_value(payload).map_err(|e| ProtocolError::SchemaValidation(e.to_string()))?;
        info!(
            cp_id = session.cp_id(),
            ?request.requested_message,
            ?request.connector_id,
            "TriggerMessage"
        );

        match request.requested_message {
            MessageTrigger::BootNotification => {
                if let Ok(body) = messages::boot_notification(session.config()) {
                    session.send(OcppFrame::call("BootNotification", body));
                }
                Ok(json!({ "status": "Accepted" }))
            }
            MessageTrigger::Heartbeat => {
                session.send(OcppFrame::call("Heartbeat", messages::heartbeat()));
                Ok(json!({ "status": "Accepted" }))
            }
            MessageTrigger::StatusNotification => {
                let connector_id = request.connector_id.unwrap_or(0);
                let (status, error_code) = if connector_id == 0 {
                    let runtime = session.runtime();
                    let guard = runtime.lock().await;
                    (connector_status_from_ocpp(guard.connector_zero_status), guard.connector_zero_error)
                } else {
                    let runtime = session.runtime();
                    let guard = runtime.lock().await;
                    match guard.connector(connector_id) {
                        Some(c) => (c.status, c.error_code),
                        None => (ConnectorStatus::Available, ChargePointErrorCode::NoError),
                    }
                };
                let body = messages::status_notification(connector_id, status, error_code, None);
                session.send(OcppFrame::call("StatusNotification", body));
                Ok(json!({ "status": "Accepted" }))
            }
            _ => Ok(json!({ "status": "NotImplemented" })),
        }
    }
}

fn connector_status_from_ocpp(status: rust_ocpp::v1_6::types::ChargePointStatus) -> ConnectorStatus {
    use rust_ocpp::v1_6::types::ChargePointStatus as S;
    match status {
        S::Available => ConnectorStatus::Available,
        S::Preparing => ConnectorStatus::Preparing,
        S::Charging => ConnectorStatus::Charging,
        S::SuspendedEV => ConnectorStatus::SuspendedEV,
        S::SuspendedEVSE => ConnectorStatus::SuspendedEVSE,
        S::Finishing => ConnectorStatus::Finishing,
        S::Reserved => ConnectorStatus::Reserved,
        S::Unavailable => ConnectorStatus::Unavailable,
        S::Faulted => ConnectorStatus::Faulted,
    }
}
