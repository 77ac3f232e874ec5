//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, ConnectionIdFactory, Timestamp},
    ui::state::AppState,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    // onConnect: every socket gets its own id and outbound channel
    let connection_id = ConnectionIdFactory::generate();
    let rx = state.connections.register(connection_id).await;
    tracing::info!("Connection {} opened", connection_id);

    let (sender, receiver) = socket.split();

    let mut recv_task = tokio::spawn(receive_frames(receiver, state.clone(), connection_id));
    let mut send_task = tokio::spawn(forward_frames(rx, sender));

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // onClose: leave the room before the channel goes away
    state.relay.on_close(&connection_id).await;
    let connected_at = state.connections.connected_at(&connection_id).await;
    state.connections.unregister(&connection_id).await;
    match connected_at {
        Some(at) => tracing::info!(
            "Connection {} closed after {} ms",
            connection_id,
            Timestamp::now().value() - at.value()
        ),
        None => tracing::info!("Connection {} closed", connection_id),
    }
}

/// Feed inbound text frames to the relay until the socket ends.
async fn receive_frames(
    mut receiver: futures_util::stream::SplitStream<WebSocket>,
    state: Arc<AppState>,
    connection_id: ConnectionId,
) {
    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!("WebSocket error on {}: {}", connection_id, e);
                break;
            }
        };

        match msg {
            Message::Text(text) => {
                tracing::debug!("Received from {}: {}", connection_id, text.as_str());
                if let Err(e) = state.relay.on_message(connection_id, text.as_str()).await {
                    tracing::error!("Closing connection {}: {}", connection_id, e);
                    break;
                }
            }
            Message::Binary(_) => {
                tracing::debug!("Ignoring binary frame from {}", connection_id);
            }
            Message::Close(_) => {
                tracing::info!("Connection {} requested close", connection_id);
                break;
            }
            // Ping/pong is handled automatically by the WebSocket protocol
            Message::Ping(_) | Message::Pong(_) => {}
        }
    }
}

/// Drain the connection's outbound channel into the socket.
async fn forward_frames(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) {
    while let Some(frame) = rx.recv().await {
        if sender.send(Message::Text(frame.into())).await.is_err() {
            break;
        }
    }
}
