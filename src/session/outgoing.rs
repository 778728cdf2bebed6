//! Response handlers for Outgoing (VCP-initiated) actions, fired whenever
//! a correlated CallResult/CallError arrives — regardless of whether the
//! original caller is still awaiting it (see `protocol::dispatch`).

use serde_json::Value;
use tracing::warn;

use crate::protocol::dispatch::Dispatcher;
use crate::session::flow;
use crate::session::vcp_session::VcpSession;

pub fn register_default_outgoing_handlers(dispatcher: &mut Dispatcher) {
    dispatcher.register_outgoing_response("StartTransaction", std::sync::Arc::new(on_start_transaction_response));
}

fn on_start_transaction_response(session: VcpSession, original: Value, result: Value) {
    let connector_id = original.get("connectorId").and_then(|v| v.as_u64()).map(|v| v as u32);
    let id_tag = original.get("idTag").and_then(|v| v.as_str()).map(str::to_string);
    let transaction_id = result.get("transactionId").and_then(|v| v.as_i64()).map(|v| v as i32);

    let (connector_id, id_tag, transaction_id) = match (connector_id, id_tag, transaction_id) {
        (Some(c), Some(t), Some(tx)) => (c, t, tx),
        _ => {
            warn!(cp_id = session.cp_id(), "malformed StartTransaction exchange; cannot bind transactionId");
            return;
        }
    };

    let sample_interval_secs = {
        let runtime = session.runtime();
        // `try_lock` avoids blocking this synchronous callback; the table
        // is only contended by the session's own read loop.
        match runtime.try_lock() {
            Ok(guard) => guard
                .config_table
                .get(Some(&["MeterValueSampleInterval".to_string()]))
                .0
                .first()
                .and_then(|(_, entry)| entry.value.parse::<u64>().ok())
                .unwrap_or(60),
            Err(_) => 60,
        }
    };

    tokio::spawn(async move {
        flow::bind_transaction(&session, connector_id, id_tag, transaction_id, sample_interval_secs).await;
    });
}
