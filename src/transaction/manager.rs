//! Per-session active-transaction bookkeeping and the built-in meter timer.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::charger::meter::build_meter_value;
use crate::charger::runtime::ChargerRuntime;
use crate::protocol::envelope::OcppFrame;
use crate::session::vcp_session::VcpSession;

const DEFAULT_SAMPLE_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct TransactionState {
    pub transaction_id: i32,
    pub connector_id: u32,
    pub id_tag: String,
    pub started_at: DateTime<Utc>,
    pub sample_interval_secs: u64,
}

struct TransactionEntry {
    state: TransactionState,
    timer: Option<JoinHandle<()>>,
}

/// Owns one session's active transactions plus each one's fallback meter
/// timer. The Fleet Manager's richer 15s loop pre-empts this by calling
/// [`TransactionManager::stop_transaction`] right after binding a
/// transaction to a connector.
#[derive(Default)]
pub struct TransactionManager {
    transactions: DashMap<i32, TransactionEntry>,
}

impl TransactionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `state` and starts its periodic 1-phase meter timer.
    pub fn start_transaction(
        &self,
        session: VcpSession,
        runtime: Arc<Mutex<ChargerRuntime>>,
        state: TransactionState,
    ) {
        let transaction_id = state.transaction_id;
        let connector_id = state.connector_id;
        let interval_secs = if state.sample_interval_secs == 0 {
            DEFAULT_SAMPLE_INTERVAL_SECS
        } else {
            state.sample_interval_secs
        };

        let timer = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
            loop {
                ticker.tick().await;
                let (offered, energy) = {
                    let guard = runtime.lock().await;
                    match guard.connectors.iter().find(|c| c.connector_id == connector_id) {
                        Some(c) => (c.offered_current_a, c.energy_imported_wh),
                        None => return,
                    }
                };
                let sample = build_meter_value(
                    Utc::now(),
                    interval_secs as f64,
                    energy,
                    offered,
                    offered,
                    1,
                    None,
                );
                let payload = serde_json::json!({
                    "connectorId": connector_id,
                    "transactionId": transaction_id,
                    "meterValue": [sample.meter_value],
                });
                session.send(OcppFrame::call("MeterValues", payload));
            }
        });

        self.transactions.insert(
            transaction_id,
            TransactionEntry {
                state,
                timer: Some(timer),
            },
        );
        debug!(transaction_id, connector_id, "transaction registered");
    }

    /// Stops the timer and removes the entry, if present.
    pub fn stop_transaction(&self, transaction_id: i32) {
        if let Some((_, mut entry)) = self.transactions.remove(&transaction_id) {
            if let Some(timer) = entry.timer.take() {
                timer.abort();
            }
        } else {
            warn!(transaction_id, "stop_transaction called for unknown transaction");
        }
    }

    pub fn transaction_for_connector(&self, connector_id: u32) -> Option<i32> {
        self.transactions
            .iter()
            .find(|entry| entry.value().state.connector_id == connector_id)
            .map(|entry| *entry.key())
    }

    pub fn get(&self, transaction_id: i32) -> Option<TransactionState> {
        self.transactions.get(&transaction_id).map(|e| e.state.clone())
    }
}
