//! Connection table: outbound channels of every live socket.
//!
//! Each accepted WebSocket registers an unbounded mpsc channel here; its
//! writer task drains the receiver into the socket. The table implements
//! [`MessagePusher`], so use cases reach sockets only through a
//! [`ConnectionId`].

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

use crate::domain::{ConnectionId, MessagePusher, PushError, Timestamp};

/// Outbound side of one live connection
struct ConnectionHandle {
    /// Message sender channel
    sender: mpsc::UnboundedSender<String>,
    /// Timestamp when the socket was accepted
    connected_at: Timestamp,
}

/// Live connections keyed by id
#[derive(Default)]
pub struct ConnectionTable {
    connections: Mutex<HashMap<ConnectionId, ConnectionHandle>>,
}

impl ConnectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection and return the receiver its writer task drains.
    ///
    /// Registering an id twice replaces the previous channel, which closes
    /// the old receiver.
    pub async fn register(&self, connection_id: ConnectionId) -> mpsc::UnboundedReceiver<String> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = ConnectionHandle {
            sender,
            connected_at: Timestamp::now(),
        };
        self.connections.lock().await.insert(connection_id, handle);
        receiver
    }

    /// Drop the connection's channel. Returns whether it was registered.
    pub async fn unregister(&self, connection_id: &ConnectionId) -> bool {
        self.connections.lock().await.remove(connection_id).is_some()
    }

    /// When the connection was accepted, if it is still registered.
    pub async fn connected_at(&self, connection_id: &ConnectionId) -> Option<Timestamp> {
        self.connections
            .lock()
            .await
            .get(connection_id)
            .map(|handle| handle.connected_at)
    }

    /// Number of open sockets, joined or not.
    pub async fn count(&self) -> usize {
        self.connections.lock().await.len()
    }
}

#[async_trait]
impl MessagePusher for ConnectionTable {
    async fn push(&self, connection_id: &ConnectionId, frame: &str) -> Result<(), PushError> {
        let connections = self.connections.lock().await;
        let handle = connections
            .get(connection_id)
            .ok_or(PushError::ConnectionNotFound(*connection_id))?;
        handle
            .sender
            .send(frame.to_string())
            .map_err(|_| PushError::ConnectionClosed(*connection_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConnectionIdFactory;

    #[tokio::test]
    async fn test_push_to_registered_connection() {
        // テスト項目: 登録済みの接続にフレームを送れる
        // given (前提条件):
        let table = ConnectionTable::new();
        let id = ConnectionIdFactory::generate();
        let mut rx = table.register(id).await;

        // when (操作):
        let result = table.push(&id, "hello").await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(rx.recv().await.unwrap(), "hello");
        assert!(table.connected_at(&id).await.is_some());
    }

    #[tokio::test]
    async fn test_push_to_unknown_connection_fails() {
        // テスト項目: 未登録の接続への送信は即座に失敗する
        // given (前提条件):
        let table = ConnectionTable::new();
        let id = ConnectionIdFactory::generate();

        // when (操作):
        let result = table.push(&id, "hello").await;

        // then (期待する結果):
        assert_eq!(result, Err(PushError::ConnectionNotFound(id)));
    }

    #[tokio::test]
    async fn test_push_to_closed_receiver_fails() {
        // テスト項目: 受信側が閉じた接続への送信は即座に失敗する
        // given (前提条件):
        let table = ConnectionTable::new();
        let id = ConnectionIdFactory::generate();
        let rx = table.register(id).await;
        drop(rx);

        // when (操作):
        let result = table.push(&id, "hello").await;

        // then (期待する結果):
        assert_eq!(result, Err(PushError::ConnectionClosed(id)));
    }

    #[tokio::test]
    async fn test_unregister() {
        // テスト項目: 登録解除は 1 度目だけ true を返す
        // given (前提条件):
        let table = ConnectionTable::new();
        let id = ConnectionIdFactory::generate();
        let _rx = table.register(id).await;

        // when (操作):
        let first = table.unregister(&id).await;
        let second = table.unregister(&id).await;

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        assert_eq!(table.count().await, 0);
    }
}
