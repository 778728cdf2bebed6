//! Routes inbound Call frames to per-action handlers, and inbound
//! CallResult/CallError frames to the Outgoing action's response handler.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::protocol::error::ProtocolError;
use crate::protocol::error_code::OcppErrorCode;
use crate::protocol::registry::is_incoming_action;
use crate::session::vcp_session::VcpSession;

/// Implemented once per Incoming (CSMS-initiated) action.
#[async_trait]
pub trait IncomingHandler: Send + Sync {
    async fn handle(&self, session: &VcpSession, payload: Value) -> Result<Value, ProtocolError>;
}

/// Invoked when a CallResult/CallError for a given Outgoing action arrives,
/// regardless of whether the original caller is still awaiting it.
pub type ResponseHandler = Arc<dyn Fn(VcpSession, Value, Value) + Send + Sync>;

#[derive(Default)]
pub struct Dispatcher {
    incoming: HashMap<&'static str, Arc<dyn IncomingHandler>>,
    outgoing_res_handlers: HashMap<&'static str, ResponseHandler>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_incoming(&mut self, action: &'static str, handler: Arc<dyn IncomingHandler>) {
        self.incoming.insert(action, handler);
    }

    pub fn register_outgoing_response(&mut self, action: &'static str, handler: ResponseHandler) {
        self.outgoing_res_handlers.insert(action, handler);
    }

    /// Route an inbound Call. Always returns a frame payload (Ok) or an
    /// OCPP error code to wrap into a CallError by the caller.
    pub async fn dispatch_incoming(
        &self,
        session: &VcpSession,
        action: &str,
        payload: Value,
    ) -> Result<Value, (OcppErrorCode, String)> {
        if !is_incoming_action(action) {
            return Err((
                OcppErrorCode::NotImplemented,
                format!("action not supported: {action}"),
            ));
        }

        match self.incoming.get(action) {
            Some(handler) => handler
                .handle(session, payload)
                .await
                .map_err(|e| (e.error_code(), e.to_string())),
            None => {
                warn!(action, "incoming action registered but no handler bound");
                Err((OcppErrorCode::NotImplemented, format!("no handler for {action}")))
            }
        }
    }

    /// Fire the Outgoing response handler for `action`, if one is registered.
    pub fn on_outgoing_response(&self, action: &str, session: VcpSession, original: Value, result: Value) {
        if let Some(handler) = self.outgoing_res_handlers.get(action) {
            handler(session, original, result);
        }
    }
}
