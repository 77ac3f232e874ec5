//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use hiroba_server::ui::{AppState, serve};
use serde_json::Value;
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

/// In-process server bound to an ephemeral port, stopped on drop.
pub struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");
        let (tx, rx) = oneshot::channel::<()>();
        let state = Arc::new(AppState::in_memory());

        let handle = tokio::spawn(async move {
            let shutdown = async move {
                let _ = rx.await;
            };
            serve(listener, state, shutdown)
                .await
                .expect("Test server failed");
        });

        Self {
            addr,
            shutdown: Some(tx),
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.abort();
    }
}

/// Minimal WebSocket chat client speaking the relay's JSON frames.
pub struct TestClient {
    stream: WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>,
}

impl TestClient {
    pub async fn connect(server: &TestServer) -> Self {
        let (stream, _) = connect_async(server.ws_url())
            .await
            .expect("Failed to connect WebSocket");
        Self { stream }
    }

    pub async fn send_raw(&mut self, raw: &str) {
        self.stream
            .send(Message::Text(raw.into()))
            .await
            .expect("Failed to send frame");
    }

    pub async fn send_json(&mut self, value: Value) {
        self.send_raw(&value.to_string()).await;
    }

    pub async fn join(&mut self, room: &str, username: &str) {
        self.send_json(serde_json::json!({
            "type": "join",
            "payload": {"roomId": room, "username": username}
        }))
        .await;
    }

    pub async fn chat(&mut self, message: &str) {
        self.send_json(serde_json::json!({"type": "chat", "payload": {"message": message}}))
            .await;
    }

    pub async fn typing(&mut self) {
        self.send_json(serde_json::json!({"type": "typing"})).await;
    }

    /// Next text frame as JSON, or `None` if nothing arrives within `wait`.
    pub async fn recv_within(&mut self, wait: Duration) -> Option<Value> {
        loop {
            let next = tokio::time::timeout(wait, self.stream.next()).await.ok()??;
            match next.ok()? {
                Message::Text(text) => {
                    return Some(serde_json::from_str(text.as_str()).expect("Invalid JSON frame"));
                }
                Message::Close(_) => return None,
                _ => continue,
            }
        }
    }

    /// Next text frame as JSON; panics after two seconds of silence.
    pub async fn recv(&mut self) -> Value {
        self.recv_within(Duration::from_secs(2))
            .await
            .expect("Timed out waiting for a frame")
    }

    /// Assert that nothing arrives for a short while.
    pub async fn expect_silence(&mut self) {
        let frame = self.recv_within(Duration::from_millis(200)).await;
        assert!(frame.is_none(), "Unexpected frame: {frame:?}");
    }

    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}

pub fn system(message: &str) -> Value {
    serde_json::json!({"type": "system", "payload": {"message": message}})
}

pub fn chat(sender: &str, message: &str) -> Value {
    serde_json::json!({"type": "chat", "payload": {"sender": sender, "message": message}})
}

pub fn typing(username: &str) -> Value {
    serde_json::json!({"type": "typing", "payload": {"username": username}})
}

pub fn error(message: &str) -> Value {
    serde_json::json!({"type": "error", "payload": {"message": message}})
}
