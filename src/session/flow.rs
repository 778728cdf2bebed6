//! Multi-step flows that span several outbound Calls: starting and
//! stopping a transaction. Shared by the `RemoteStartTransaction`/
//! `RemoteStopTransaction` Incoming handlers and, later, the Fleet
//! Manager's own admin-triggered `startTransaction`/`stopTransaction`.

use std::time::Duration;

use rand::Rng;
use rust_ocpp::v1_6::types::{ChargePointErrorCode, Reason};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::charger::connector::ConnectorStatus;
use crate::protocol::envelope::OcppFrame;
use crate::session::messages;
use crate::session::vcp_session::VcpSession;
use crate::transaction::manager::TransactionState;

const AUTHORIZE_TO_START_DELAY: Duration = Duration::from_millis(500);
const TRANSACTION_ID_POLL_INTERVAL: Duration = Duration::from_millis(200);
const TRANSACTION_ID_POLL_ITERATIONS: u32 = 50;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FlowError {
    #[error("connector already has an active transaction")]
    AlreadyActive,
    #[error("unknown connector")]
    UnknownConnector,
}

/// Writes the connector's status, then emits a StatusNotification for it.
pub async fn set_connector_status(
    session: &VcpSession,
    connector_id: u32,
    status: ConnectorStatus,
    error_code: ChargePointErrorCode,
) {
    {
        let runtime = session.runtime();
        let mut guard = runtime.lock().await;
        if connector_id == 0 {
            guard.connector_zero_status = status.as_ocpp();
            guard.connector_zero_error = error_code;
        } else if let Some(connector) = guard.connector_mut(connector_id) {
            connector.status = status;
            connector.error_code = error_code;
        }
    }
    let payload = messages::status_notification(connector_id, status, error_code, None);
    session.send(OcppFrame::call("StatusNotification", payload));
}

/// Validates step 1 synchronously (so an admin caller gets an immediate
/// refusal), then runs the Authorize/StartTransaction handshake in the
/// background.
pub async fn start_transaction(session: VcpSession, connector_id: u32, id_tag: String) -> Result<(), FlowError> {
    {
        let runtime = session.runtime();
        let guard = runtime.lock().await;
        match guard.connector(connector_id) {
            Some(c) if c.transaction_id.is_some() => return Err(FlowError::AlreadyActive),
            Some(_) => {}
            None => return Err(FlowError::UnknownConnector),
        }
    }

    tokio::spawn(run_start_transaction(session, connector_id, id_tag));
    Ok(())
}

async fn run_start_transaction(session: VcpSession, connector_id: u32, id_tag: String) {
    let cp_id = session.cp_id().to_string();

    let auth_payload = match messages::authorize(&id_tag) {
        Ok(p) => p,
        Err(e) => {
            warn!(cp_id, connector_id, error = e, "rejected outgoing Authorize");
            return;
        }
    };
    match session.call("Authorize", auth_payload).await {
        Ok(response) if authorize_accepted(&response) => {}
        Ok(response) => {
            warn!(cp_id, connector_id, ?response, "Authorize not accepted; aborting start-transaction flow");
            return;
        }
        Err(e) => {
            warn!(cp_id, connector_id, error = %e, "Authorize call failed; aborting start-transaction flow");
            return;
        }
    }

    tokio::time::sleep(AUTHORIZE_TO_START_DELAY).await;

    let meter_start = {
        let runtime = session.runtime();
        let guard = runtime.lock().await;
        guard
            .connector(connector_id)
            .map(|c| c.energy_imported_wh.round() as i32)
            .unwrap_or(0)
    };

    match messages::start_transaction(connector_id, &id_tag, meter_start) {
        Ok(payload) => session.send(OcppFrame::call("StartTransaction", payload)),
        Err(e) => {
            warn!(cp_id, connector_id, error = e, "rejected outgoing StartTransaction");
            return;
        }
    }

    set_connector_status(&session, connector_id, ConnectorStatus::Preparing, ChargePointErrorCode::NoError).await;

    for _ in 0..TRANSACTION_ID_POLL_ITERATIONS {
        tokio::time::sleep(TRANSACTION_ID_POLL_INTERVAL).await;
        let (bound_id, has_car) = {
            let runtime = session.runtime();
            let guard = runtime.lock().await;
            match guard.connector(connector_id) {
                Some(c) => (c.transaction_id, c.car.is_some()),
                None => return,
            }
        };
        if let Some(transaction_id) = bound_id {
            // The Fleet Manager runs its own 15s meter loop once a car is
            // plugged in; disable the built-in 60s timer so we don't double
            // up on MeterValues for the rest of the session.
            session.transactions().stop_transaction(transaction_id);
            if has_car {
                set_connector_status(&session, connector_id, ConnectorStatus::SuspendedEV, ChargePointErrorCode::NoError)
                    .await;
                let delay_ms = rand::thread_rng().gen_range(2000..=3000);
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                set_connector_status(&session, connector_id, ConnectorStatus::Charging, ChargePointErrorCode::NoError)
                    .await;
            }
            return;
        }
    }
    warn!(cp_id, connector_id, "transactionId poll timed out after 10s");
}

fn authorize_accepted(response: &Value) -> bool {
    response
        .get("idTagInfo")
        .and_then(|v| v.get("status"))
        .and_then(|v| v.as_str())
        == Some("Accepted")
}

/// Sends StopTransaction for whichever connector currently holds
/// `transaction_id`, then clears the binding.
pub async fn stop_transaction_by_id(session: VcpSession, transaction_id: i32, reason: Option<Reason>) {
    let (connector_id, meter_stop, has_car) = {
        let runtime = session.runtime();
        let guard = runtime.lock().await;
        match guard.connectors.iter().find(|c| c.transaction_id == Some(transaction_id)) {
            Some(c) => (c.connector_id, c.energy_imported_wh.round() as i32, c.car.is_some()),
            None => {
                warn!(cp_id = session.cp_id(), transaction_id, "stopTransaction: no connector holds this id");
                return;
            }
        }
    };

    match messages::stop_transaction(transaction_id, meter_stop, None, reason) {
        Ok(payload) => session.send(OcppFrame::call("StopTransaction", payload)),
        Err(e) => warn!(cp_id = session.cp_id(), error = e, "rejected outgoing StopTransaction"),
    }

    session.transactions().stop_transaction(transaction_id);
    {
        let runtime = session.runtime();
        let mut guard = runtime.lock().await;
        if let Some(connector) = guard.connector_mut(connector_id) {
            connector.transaction_id = None;
        }
    }

    let next_status = if has_car { ConnectorStatus::Preparing } else { ConnectorStatus::Available };
    set_connector_status(&session, connector_id, next_status, ChargePointErrorCode::NoError).await;
}

/// Stops whatever transaction is bound to `connector_id`, if any.
pub async fn stop_transaction_on_connector(session: VcpSession, connector_id: u32, reason: Option<Reason>) {
    let transaction_id = {
        let runtime = session.runtime();
        let guard = runtime.lock().await;
        guard.connector(connector_id).and_then(|c| c.transaction_id)
    };
    match transaction_id {
        Some(id) => stop_transaction_by_id(session, id, reason).await,
        None => warn!(cp_id = session.cp_id(), connector_id, "stopTransaction: connector has no active transaction"),
    }
}

/// Binds a CSMS-assigned `transactionId`, called from the Outgoing
/// `StartTransaction` response handler.
pub async fn bind_transaction(
    session: &VcpSession,
    connector_id: u32,
    id_tag: String,
    transaction_id: i32,
    sample_interval_secs: u64,
) {
    {
        let runtime = session.runtime();
        let mut guard = runtime.lock().await;
        if let Some(connector) = guard.connector_mut(connector_id) {
            connector.transaction_id = Some(transaction_id);
        }
    }
    session.transactions().start_transaction(
        session.clone(),
        session.runtime(),
        TransactionState {
            transaction_id,
            connector_id,
            id_tag,
            started_at: chrono::Utc::now(),
            sample_interval_secs,
        },
    );
}
