#![allow(dead_code)]
//! In-process mock CSMS: accepts OCPP-J WebSocket connections the same way
//! a real central system would, records every inbound Call in arrival
//! order, answers with canned (overridable) responses, and can itself
//! place CSMS-initiated Calls against a connected charger.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};
use tokio_tungstenite::tungstenite::Message;

#[derive(Debug, Clone)]
pub struct InboundCall {
    pub action: String,
    pub payload: Value,
}

struct Connection {
    outbound_tx: mpsc::UnboundedSender<Message>,
    pending: Arc<Mutex<HashMap<String, oneshot::Sender<Value>>>>,
}

pub struct MockCsms {
    addr: SocketAddr,
    log: Mutex<HashMap<String, Vec<InboundCall>>>,
    responses: Mutex<HashMap<String, Value>>,
    connections: Mutex<HashMap<String, Connection>>,
    next_transaction_id: AtomicI32,
}

impl MockCsms {
    pub async fn start() -> Arc<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock CSMS listener");
        let addr = listener.local_addr().expect("mock CSMS local addr");
        let server = Arc::new(Self {
            addr,
            log: Mutex::new(HashMap::new()),
            responses: Mutex::new(HashMap::new()),
            connections: Mutex::new(HashMap::new()),
            next_transaction_id: AtomicI32::new(42),
        });

        let accept_loop_server = server.clone();
        tokio::spawn(async move {
            loop {
                let (stream, _) = match listener.accept().await {
                    Ok(pair) => pair,
                    Err(_) => return,
                };
                let server = accept_loop_server.clone();
                tokio::spawn(async move {
                    server.handle_connection(stream).await;
                });
            }
        });

        server
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Overrides the canned CallResult body for a given action, for every
    /// connection from this point forward.
    pub async fn set_response(&self, action: &str, value: Value) {
        self.responses.lock().await.insert(action.to_string(), value);
    }

    pub async fn log_for(&self, cp_id: &str) -> Vec<InboundCall> {
        self.log.lock().await.get(cp_id).cloned().unwrap_or_default()
    }

    pub async fn actions_for(&self, cp_id: &str) -> Vec<String> {
        self.log_for(cp_id).await.into_iter().map(|c| c.action).collect()
    }

    /// Sends a CSMS-initiated Call to an already-connected charger and
    /// awaits its CallResult.
    pub async fn call(&self, cp_id: &str, action: &str, payload: Value) -> Value {
        let message_id = uuid::Uuid::new_v4().to_string();
        let (tx, rx) = oneshot::channel();
        let outbound_tx = {
            let connections = self.connections.lock().await;
            let conn = connections.get(cp_id).expect("mock CSMS call: charger not connected");
            conn.pending.lock().await.insert(message_id.clone(), tx);
            conn.outbound_tx.clone()
        };
        let frame = json!([2, message_id, action, payload]);
        let _ = outbound_tx.send(Message::Text(frame.to_string()));
        rx.await.expect("mock CSMS call answered before connection closed")
    }

    async fn handle_connection(self: Arc<Self>, stream: TcpStream) {
        let mut cp_id = String::new();
        let ws_stream = match tokio_tungstenite::accept_hdr_async(stream, |req: &Request, response: Response| {
            cp_id = req.uri().path().trim_start_matches('/').to_string();
            Ok(response)
        })
        .await
        {
            Ok(stream) => stream,
            Err(_) => return,
        };

        let (mut sink, mut stream) = ws_stream.split();
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();
        let pending = Arc::new(Mutex::new(HashMap::new()));

        self.connections.lock().await.insert(
            cp_id.clone(),
            Connection {
                outbound_tx: outbound_tx.clone(),
                pending: pending.clone(),
            },
        );

        let writer = tokio::spawn(async move {
            while let Some(msg) = outbound_rx.recv().await {
                if sink.send(msg).await.is_err() {
                    break;
                }
            }
        });

        while let Some(Ok(msg)) = stream.next().await {
            match msg {
                Message::Text(text) => self.on_text(&cp_id, &text, &outbound_tx, &pending).await,
                Message::Close(_) => break,
                _ => {}
            }
        }

        self.connections.lock().await.remove(&cp_id);
        writer.abort();
    }

    async fn on_text(
        &self,
        cp_id: &str,
        text: &str,
        outbound_tx: &mpsc::UnboundedSender<Message>,
        pending: &Arc<Mutex<HashMap<String, oneshot::Sender<Value>>>>,
    ) {
        let arr: Vec<Value> = match serde_json::from_str(text) {
            Ok(v) => v,
            Err(_) => return,
        };
        let msg_type = arr.first().and_then(|v| v.as_u64()).unwrap_or(0);

        match msg_type {
            2 => {
                let message_id = arr[1].as_str().unwrap_or_default().to_string();
                let action = arr[2].as_str().unwrap_or_default().to_string();
                let payload = arr.get(3).cloned().unwrap_or_else(|| json!({}));

                self.log
                    .lock()
                    .await
                    .entry(cp_id.to_string())
                    .or_default()
                    .push(InboundCall { action: action.clone(), payload: payload.clone() });

                let response = self.response_for(&action).await;
                let frame = json!([3, message_id, response]);
                let _ = outbound_tx.send(Message::Text(frame.to_string()));
            }
            3 => {
                let message_id = arr[1].as_str().unwrap_or_default().to_string();
                let payload = arr.get(2).cloned().unwrap_or_else(|| json!({}));
                if let Some(tx) = pending.lock().await.remove(&message_id) {
                    let _ = tx.send(payload);
                }
            }
            _ => {}
        }
    }

    async fn response_for(&self, action: &str) -> Value {
        if let Some(custom) = self.responses.lock().await.get(action) {
            return custom.clone();
        }
        match action {
            "BootNotification" => json!({
                "status": "Accepted",
                "currentTime": chrono::Utc::now(),
                "interval": 300,
            }),
            "StartTransaction" => {
                let transaction_id = self.next_transaction_id.fetch_add(1, Ordering::SeqCst);
                json!({ "transactionId": transaction_id, "idTagInfo": { "status": "Accepted" } })
            }
            "Authorize" | "StopTransaction" => json!({ "idTagInfo": { "status": "Accepted" } }),
            _ => json!({}),
        }
    }
}
