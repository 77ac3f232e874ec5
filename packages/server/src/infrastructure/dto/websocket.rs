//! WebSocket frame DTOs for the chat relay.
//!
//! Every frame is one JSON object `{ "type": ..., "payload": {...} }`.
//! Inbound frames are parsed into the closed [`ClientFrame`] set; anything
//! else is reported as a [`FrameError`] so the caller can drop it.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

/// Errors raised while parsing an inbound frame
#[derive(Debug, Error)]
pub enum FrameError {
    /// Not JSON at all
    #[error("frame is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Valid JSON, but not an object with a string `type`
    #[error("frame is not an object with a string 'type'")]
    InvalidEnvelope,

    /// `type` is not one the relay understands
    #[error("unknown frame type '{0}'")]
    UnknownType(String),

    /// `payload` is missing or not an object
    #[error("payload for '{0}' is not an object")]
    PayloadNotObject(&'static str),

    /// `payload` lacks required fields
    #[error("invalid payload for '{kind}': {source}")]
    InvalidPayload {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct JoinPayload {
    #[serde(rename = "roomId")]
    room_id: String,
    username: String,
}

#[derive(Debug, Deserialize)]
struct ChatPayload {
    message: String,
}

/// Frame sent by a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientFrame {
    /// Join `room_id` as `username`
    Join { room_id: String, username: String },
    /// Chat message to the sender's room
    Chat { message: String },
    /// The sender is typing; the payload is ignored
    Typing,
}

impl ClientFrame {
    /// Parse one raw text frame.
    ///
    /// Only JSON objects are accepted, for the envelope and for the
    /// `join`/`chat` payloads; positional arrays are rejected.
    pub fn parse(raw: &str) -> Result<Self, FrameError> {
        let Value::Object(mut envelope) = serde_json::from_str::<Value>(raw)? else {
            return Err(FrameError::InvalidEnvelope);
        };
        let kind = match envelope.remove("type") {
            Some(Value::String(kind)) => kind,
            _ => return Err(FrameError::InvalidEnvelope),
        };
        let payload = envelope.remove("payload").unwrap_or(Value::Null);

        match kind.as_str() {
            "join" => {
                let payload: JoinPayload = payload_as("join", payload)?;
                Ok(Self::Join {
                    room_id: payload.room_id,
                    username: payload.username,
                })
            }
            "chat" => {
                let payload: ChatPayload = payload_as("chat", payload)?;
                Ok(Self::Chat {
                    message: payload.message,
                })
            }
            "typing" => Ok(Self::Typing),
            _ => Err(FrameError::UnknownType(kind)),
        }
    }

    /// Frame type as it appears on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::Chat { .. } => "chat",
            Self::Typing => "typing",
        }
    }
}

fn payload_as<T: DeserializeOwned>(kind: &'static str, payload: Value) -> Result<T, FrameError> {
    if !payload.is_object() {
        return Err(FrameError::PayloadNotObject(kind));
    }
    serde_json::from_value(payload).map_err(|source| FrameError::InvalidPayload { kind, source })
}

/// Frame sent by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum ServerFrame {
    /// Chat message relayed to the room
    Chat { sender: String, message: String },
    /// Another member of the room is typing
    Typing { username: String },
    /// Room notice (joins and leaves)
    System { message: String },
    /// Rejection addressed to the requester only
    Error { message: String },
}

impl ServerFrame {
    /// Serialize to the JSON text sent over the socket.
    pub fn to_json(&self) -> String {
        // Plain string fields only, serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}
