pub mod error;
pub mod flow;
pub mod handlers;
pub mod messages;
pub mod outgoing;
pub mod pending;
pub mod vcp_session;

use std::sync::Arc;

use crate::protocol::dispatch::Dispatcher;

/// Builds the one `Dispatcher` shared by every VCP session: every Incoming
/// action handler plus the Outgoing response handlers.
pub fn default_dispatcher() -> Arc<Dispatcher> {
    let mut dispatcher = Dispatcher::new();
    handlers::register_all(&mut dispatcher);
    outgoing::register_default_outgoing_handlers(&mut dispatcher);
    Arc::new(dispatcher)
}

/// `V201` only negotiates the subprotocol header; the OCPP 2.0.1 message
/// surface itself is out of scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcppVersion {
    V16,
    V201,
}

impl OcppVersion {
    pub fn subprotocol(self) -> &'static str {
        match self {
            Self::V16 => "ocpp1.6",
            Self::V201 => "ocpp2.0.1",
        }
    }
}
