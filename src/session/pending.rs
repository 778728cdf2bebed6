//! Correlation table: `messageId -> PendingCall`, one per session.

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::session::error::SessionError;

pub struct PendingCall {
    pub action: String,
    pub payload: Value,
    responder: oneshot::Sender<Result<Value, SessionError>>,
}

/// Invariant: a given `messageId` is registered at most once at a time;
/// the eviction timeout is enforced by the caller wrapping `wait` in
/// `tokio::time::timeout`, which removes the entry on expiry.
#[derive(Default)]
pub struct PendingCallTable {
    entries: DashMap<String, PendingCall>,
}

impl PendingCallTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new outstanding call, returning the receiver half the
    /// caller awaits (with its own timeout).
    pub fn register(
        &self,
        message_id: String,
        action: String,
        payload: Value,
    ) -> oneshot::Receiver<Result<Value, SessionError>> {
        let (tx, rx) = oneshot::channel();
        self.entries.insert(
            message_id,
            PendingCall {
                action,
                payload,
                responder: tx,
            },
        );
        rx
    }

    /// Completes a call with a successful response, returning the
    /// original `(action, payload)` for the Outgoing resHandler lookup.
    pub fn complete_ok(&self, message_id: &str, response: Value) -> Option<(String, Value)> {
        let (_, entry) = self.entries.remove(message_id)?;
        let original = (entry.action, entry.payload.clone());
        let _ = entry.responder.send(Ok(response));
        Some(original)
    }

    pub fn complete_err(
        &self,
        message_id: &str,
        error_code: String,
        error_description: String,
    ) -> Option<(String, Value)> {
        let (_, entry) = self.entries.remove(message_id)?;
        let original = (entry.action, entry.payload.clone());
        let _ = entry.responder.send(Err(SessionError::CallError {
            error_code,
            error_description,
        }));
        Some(original)
    }

    pub fn remove(&self, message_id: &str) -> Option<PendingCall> {
        self.entries.remove(message_id).map(|(_, v)| v)
    }

    /// Fails every outstanding call, used on transport close.
    pub fn fail_all(&self, error: SessionError) {
        let keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        for key in keys {
            if let Some((_, entry)) = self.entries.remove(&key) {
                let _ = entry.responder.send(Err(error.clone()));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completes_exactly_one_awaiter() {
        let table = PendingCallTable::new();
        let rx = table.register("id1".into(), "Heartbeat".into(), serde_json::json!({}));
        assert_eq!(table.len(), 1);

        let original = table.complete_ok("id1", serde_json::json!({"currentTime": "now"}));
        assert!(original.is_some());
        assert_eq!(table.len(), 0);

        let result = rx.await.unwrap();
        assert!(result.is_ok());
    }

    #[test]
    fn unknown_message_id_completes_nothing() {
        let table = PendingCallTable::new();
        assert!(table.complete_ok("nope", serde_json::json!({})).is_none());
    }

    #[tokio::test]
    async fn fail_all_resolves_every_awaiter_with_transport_closed() {
        let table = PendingCallTable::new();
        let rx1 = table.register("a".into(), "Heartbeat".into(), serde_json::json!({}));
        let rx2 = table.register("b".into(), "Authorize".into(), serde_json::json!({}));

        table.fail_all(SessionError::TransportClosed);

        assert!(matches!(rx1.await.unwrap(), Err(SessionError::TransportClosed)));
        assert!(matches!(rx2.await.unwrap(), Err(SessionError::TransportClosed)));
        assert!(table.is_empty());
    }
}
