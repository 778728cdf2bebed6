//! `RemoteStopTransaction` — always accepted; `StopTransaction` is sent
//! in the background via `session::flow::stop_transaction_by_id`.

use async_trait::async_trait;
use rust_ocpp::v1_6::messages::remote_stop_transaction::RemoteStopTransactionRequest;
use rust_ocpp::v1_6::types::Reason;
use serde_json::{json, Value};
use tracing::info;

use crate::protocol::dispatch::IncomingHandler;
use crate::protocol::error::ProtocolError;
use crate::session::flow;
use crate::session::vcp_session::VcpSession;

pub struct RemoteStopTransaction;

#[async_trait]
impl IncomingHandler for RemoteStopTransaction {
    async fn handle(&self, session: &VcpSession, payload: Value) -> Result<Value, ProtocolError> {
        let request: RemoteStopTransactionRequest =
            serde_json::from_value(payload).map_err(|e| ProtocolError::SchemaValidation(e.to_string()))?;
        info!(cp_id = session.cp_id(), transaction_id = request.transaction_id, "RemoteStopTransaction");

        let session = session.clone();
        let transaction_id = request.transaction_id;
        tokio::spawn(async move {
            flow::stop_transaction_by_id(session, transaction_id, Some(Reason::Remote)).await;
        });

        Ok(json!({ "status": "Accepted" }))
    }
}
