//! One WebSocket connection to a CSMS: send/receive, pending-call table,
//! and lifecycle. One instance is spawned per virtual charge point.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::charger::config::ChargerConfig;
use crate::charger::runtime::ChargerRuntime;
use crate::protocol::dispatch::Dispatcher;
use crate::protocol::envelope::OcppFrame;
use crate::session::error::SessionError;
use crate::session::pending::PendingCallTable;
use crate::session::OcppVersion;
use crate::transaction::manager::TransactionManager;

#[derive(Debug, Clone)]
pub struct CloseEvent {
    pub code: u16,
    pub reason: String,
}

struct SessionInner {
    cp_id: String,
    config: ChargerConfig,
    call_timeout: Duration,
    exit_on_close: bool,
    outbound_tx: mpsc::UnboundedSender<Message>,
    pending: PendingCallTable,
    transactions: TransactionManager,
    runtime: Arc<Mutex<ChargerRuntime>>,
    dispatcher: Arc<Dispatcher>,
    close_tx: broadcast::Sender<CloseEvent>,
    closed: AtomicBool,
}

/// A cheaply cloneable handle to a VCP session's actor state. Clones share
/// the same underlying connection.
#[derive(Clone)]
pub struct VcpSession(Arc<SessionInner>);

impl VcpSession {
    /// Opens the WebSocket, advertises the correct subprotocol, and spawns
    /// the session's read loop. Does not send BootNotification — per the
    /// protocol, that is always the caller's responsibility.
    pub async fn connect(
        endpoint: &str,
        config: ChargerConfig,
        version: OcppVersion,
        exit_on_close: bool,
        call_timeout: Duration,
        dispatcher: Arc<Dispatcher>,
    ) -> Result<Self, SessionError> {
        if !(endpoint.starts_with("ws://") || endpoint.starts_with("wss://")) {
            return Err(SessionError::ConnectFailure(format!(
                "unsupported scheme in endpoint: {endpoint}"
            )));
        }

        let url = format!("{}/{}", endpoint.trim_end_matches('/'), config.cp_id);
        let mut request = url
            .into_client_request()
            .map_err(|e| SessionError::ConnectFailure(e.to_string()))?;
        request.headers_mut().insert(
            "Sec-WebSocket-Protocol",
            version
                .subprotocol()
                .parse()
                .expect("subprotocol header value is always valid"),
        );

        let (ws_stream, _response) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(|e| SessionError::ConnectFailure(e.to_string()))?;

        let (mut ws_sink, mut ws_stream) = ws_stream.split();
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();
        let (close_tx, _) = broadcast::channel(4);

        let cp_id = config.cp_id.clone();
        let runtime = Arc::new(Mutex::new(ChargerRuntime::new(config.clone())));

        let inner = Arc::new(SessionInner {
            cp_id: cp_id.clone(),
            config,
            call_timeout,
            exit_on_close,
            outbound_tx,
            pending: PendingCallTable::new(),
            transactions: TransactionManager::new(),
            runtime,
            dispatcher,
            close_tx,
            closed: AtomicBool::new(false),
        });
        let session = VcpSession(inner);

        tokio::spawn(async move {
            while let Some(msg) = outbound_rx.recv().await {
                if ws_sink.send(msg).await.is_err() {
                    break;
                }
            }
        });

        let read_loop_session = session.clone();
        tokio::spawn(async move {
            loop {
                match ws_stream.next().await {
                    Some(Ok(Message::Text(text))) => {
                        read_loop_session.on_text_frame(&text).await;
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let (code, reason) = frame
                            .map(|f| (u16::from(f.code), f.reason.to_string()))
                            .unwrap_or((1000, String::new()));
                        read_loop_session.on_close(code, reason);
                        break;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        warn!(cp_id = read_loop_session.cp_id(), error = %e, "websocket error");
                        read_loop_session.on_close(1006, e.to_string());
                        break;
                    }
                    None => {
                        read_loop_session.on_close(1006, "stream ended".to_string());
                        break;
                    }
                }
            }
        });

        info!(cp_id, "session open");
        Ok(session)
    }

    pub fn cp_id(&self) -> &str {
        &self.0.cp_id
    }

    pub fn config(&self) -> &ChargerConfig {
        &self.0.config
    }

    pub fn runtime(&self) -> Arc<Mutex<ChargerRuntime>> {
        self.0.runtime.clone()
    }

    pub fn transactions(&self) -> &TransactionManager {
        &self.0.transactions
    }

    pub fn subscribe_close(&self) -> broadcast::Receiver<CloseEvent> {
        self.0.close_tx.subscribe()
    }

    pub fn exit_on_close(&self) -> bool {
        self.0.exit_on_close
    }

    /// Schedules an outbound Call, non-blocking. The CSMS's eventual
    /// response is still routed through the Outgoing resHandler, even
    /// though nobody awaits it directly here.
    pub fn send(&self, frame: OcppFrame) {
        if let OcppFrame::Call {
            message_id,
            action,
            payload,
        } = &frame
        {
            let rx = self
                .0
                .pending
                .register(message_id.clone(), action.clone(), payload.clone());
            let session = self.clone();
            let timeout = self.0.call_timeout;
            tokio::spawn(async move {
                if (tokio::time::timeout(timeout, rx).await).is_err() {
                    session.0.pending.remove(&message_id);
                    warn!(action, message_id, "fire-and-forget call timed out");
                }
            });
        }
        self.write_frame(frame);
    }

    /// Schedules an outbound Call and awaits its correlated response.
    pub async fn call(&self, action: impl Into<String>, payload: Value) -> Result<Value, SessionError> {
        let frame = OcppFrame::call(action, payload.clone());
        let (message_id, action) = match &frame {
            OcppFrame::Call { message_id, action, .. } => (message_id.clone(), action.clone()),
            _ => unreachable!(),
        };
        let rx = self.0.pending.register(message_id.clone(), action, payload);
        self.write_frame(frame);

        match tokio::time::timeout(self.0.call_timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(SessionError::TransportClosed),
            Err(_) => {
                self.0.pending.remove(&message_id);
                Err(SessionError::CallTimeout)
            }
        }
    }

    /// Fire-and-forget CallResult/CallError response to an inbound Call.
    pub fn respond(&self, frame: OcppFrame) {
        self.write_frame(frame);
    }

    pub fn close(&self) {
        if self.0.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = self.0.outbound_tx.send(Message::Close(None));
        self.0.pending.fail_all(SessionError::TransportClosed);
    }

    fn write_frame(&self, frame: OcppFrame) {
        if self.0.outbound_tx.send(Message::Text(frame.serialize())).is_err() {
            debug!(cp_id = self.cp_id(), "attempted send on closed session");
        }
    }

    async fn on_text_frame(&self, text: &str) {
        let frame = match OcppFrame::parse(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(cp_id = self.cp_id(), error = %e, "dropping malformed frame");
                return;
            }
        };

        match frame {
            OcppFrame::Call {
                message_id,
                action,
                payload,
            } => {
                let response = self.0.dispatcher.dispatch_incoming(self, &action, payload).await;
                let reply = match response {
                    Ok(value) => OcppFrame::result(message_id, value),
                    Err((code, description)) => OcppFrame::error(message_id, code, description),
                };
                self.respond(reply);
            }
            OcppFrame::CallResult { message_id, payload } => {
                if let Some((action, original)) = self.0.pending.complete_ok(&message_id, payload.clone()) {
                    self.0
                        .dispatcher
                        .on_outgoing_response(&action, self.clone(), original, payload);
                }
            }
            OcppFrame::CallError {
                message_id,
                error_code,
                error_description,
                ..
            } => {
                error!(cp_id = self.cp_id(), message_id, error_code, "CallError received");
                self.0.pending.complete_err(&message_id, error_code, error_description);
            }
        }
    }

    fn on_close(&self, code: u16, reason: String) {
        if self.0.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        info!(cp_id = self.cp_id(), code, reason = reason.as_str(), "session closed");
        self.0.pending.fail_all(SessionError::TransportClosed);
        let _ = self.0.close_tx.send(CloseEvent { code, reason });
    }
}
