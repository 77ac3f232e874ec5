//! Room relay: per-connection protocol state machine.
//!
//! A connection starts `Unjoined`, becomes `Joined` after one successful
//! `join`, and is gone once the transport reports it closed. The registry is
//! the only record of that state; the relay never keeps its own copy.
//!
//! | state    | frame   | effect                                             |
//! |----------|---------|----------------------------------------------------|
//! | Unjoined | join    | register; announce to room, or `error` to requester |
//! | Unjoined | chat    | ignored                                            |
//! | Unjoined | typing  | ignored                                            |
//! | Joined   | join    | `error` to requester, membership unchanged         |
//! | Joined   | chat    | `chat` to the whole room, sender included          |
//! | Joined   | typing  | `typing` to the room minus the sender              |
//! | any      | close   | unregister; announce departure once                |
//! | any      | garbage | dropped                                            |
//!
//! Fields over their length limit are a business-rule rejection: the
//! requester gets an `error` frame, nothing else changes. Empty fields are
//! garbage.

use std::sync::Arc;

use crate::{
    domain::{
        ConnectionId, DisplayName, Member, MemberRegistry, MessageContent, MessagePusher,
        RegistryError, RoomId, ValueObjectError,
    },
    infrastructure::dto::{ClientFrame, ServerFrame},
};

use super::{
    JoinRoomUseCase, LeaveRoomUseCase, NotifyTypingUseCase, SendChatUseCase,
    common::{Delivery, resolve_sender},
    error::{LimitError, RelayError},
};

/// Where a connection stands in the join lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionPhase {
    Unjoined,
    Joined(Member),
}

/// What the relay did with one inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Unparseable, unknown, or invalid frame
    Dropped,
    /// Well-formed frame that the connection's phase does not allow
    Ignored,
    /// Refused; the requester got an `error` frame
    Rejected,
    /// Frame fanned out to the room
    Relayed(Delivery),
}

/// Routes inbound frames and close notifications to the use cases
pub struct RoomRelay {
    registry: Arc<dyn MemberRegistry>,
    pusher: Arc<dyn MessagePusher>,
    join_room: JoinRoomUseCase,
    send_chat: SendChatUseCase,
    notify_typing: NotifyTypingUseCase,
    leave_room: LeaveRoomUseCase,
}

impl RoomRelay {
    pub fn new(registry: Arc<dyn MemberRegistry>, pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            join_room: JoinRoomUseCase::new(registry.clone(), pusher.clone()),
            send_chat: SendChatUseCase::new(registry.clone(), pusher.clone()),
            notify_typing: NotifyTypingUseCase::new(registry.clone(), pusher.clone()),
            leave_room: LeaveRoomUseCase::new(registry.clone(), pusher.clone()),
            registry,
            pusher,
        }
    }

    /// Handle one raw text frame from `connection_id`.
    ///
    /// # Errors
    ///
    /// `RelayError::InvariantViolation` when the registry is inconsistent for
    /// this connection. The member has already been removed and its room
    /// told it left; the caller should close the socket.
    pub async fn on_message(
        &self,
        connection_id: ConnectionId,
        raw: &str,
    ) -> Result<RelayOutcome, RelayError> {
        let frame = match ClientFrame::parse(raw) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!("Dropping frame from {}: {}", connection_id, e);
                return Ok(RelayOutcome::Dropped);
            }
        };
        tracing::debug!("'{}' frame from {}", frame.kind(), connection_id);

        match frame {
            ClientFrame::Join { room_id, username } => {
                let room_id = match RoomId::new(room_id) {
                    Ok(room_id) => room_id,
                    Err(e) => return Ok(self.refuse(connection_id, &e).await),
                };
                let display_name = match DisplayName::new(username) {
                    Ok(display_name) => display_name,
                    Err(e) => return Ok(self.refuse(connection_id, &e).await),
                };
                self.join(connection_id, room_id, display_name).await
            }
            ClientFrame::Chat { message } => {
                let content = match MessageContent::new(message) {
                    Ok(content) => content,
                    Err(e) => {
                        // Unjoined senders are ignored whatever they send.
                        let sender = resolve_sender(
                            self.registry.as_ref(),
                            self.pusher.as_ref(),
                            &connection_id,
                        )
                        .await?;
                        return Ok(match sender {
                            Some(_) => self.refuse(connection_id, &e).await,
                            None => RelayOutcome::Ignored,
                        });
                    }
                };
                let delivery = self.send_chat.execute(connection_id, content).await?;
                Ok(relayed_or_ignored(delivery))
            }
            ClientFrame::Typing => {
                let delivery = self.notify_typing.execute(connection_id).await?;
                Ok(relayed_or_ignored(delivery))
            }
        }
    }

    /// Handle the transport's close notification. Safe to call repeatedly.
    pub async fn on_close(&self, connection_id: &ConnectionId) -> Option<Member> {
        let (member, delivery) = self.leave_room.execute(connection_id).await?;
        tracing::info!(
            "'{}' left room '{}' (notified {} of {})",
            member.display_name,
            member.room_id,
            delivery.delivered,
            delivery.attempted()
        );
        Some(member)
    }

    /// Current phase of `connection_id`. Read-only.
    pub async fn phase(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<ConnectionPhase, RegistryError> {
        Ok(match self.registry.find_by_connection(connection_id).await? {
            Some(member) => ConnectionPhase::Joined(member),
            None => ConnectionPhase::Unjoined,
        })
    }

    async fn join(
        &self,
        connection_id: ConnectionId,
        room_id: RoomId,
        display_name: DisplayName,
    ) -> Result<RelayOutcome, RelayError> {
        match self
            .join_room
            .execute(connection_id, room_id.clone(), display_name.clone())
            .await
        {
            Ok((member, delivery)) => {
                tracing::info!(
                    "'{}' joined room '{}' ({} members)",
                    member.display_name,
                    member.room_id,
                    delivery.attempted()
                );
                Ok(RelayOutcome::Relayed(delivery))
            }
            Err(e) => {
                tracing::warn!(
                    "Rejected join of '{}' to room '{}' from {}: {}",
                    display_name,
                    room_id,
                    connection_id,
                    e
                );
                Ok(RelayOutcome::Rejected)
            }
        }
    }

    /// Reject an over-long field with an `error` frame, drop anything else.
    async fn refuse(&self, connection_id: ConnectionId, error: &ValueObjectError) -> RelayOutcome {
        let Some(limit) = LimitError::from_value_object(error) else {
            tracing::debug!("Dropping invalid field from {}: {}", connection_id, error);
            return RelayOutcome::Dropped;
        };

        tracing::warn!("Rejected frame from {}: {}", connection_id, error);
        let frame = ServerFrame::Error {
            message: limit.to_string(),
        };
        if let Err(e) = self.pusher.push(&connection_id, &frame.to_json()).await {
            tracing::warn!("Failed to send rejection to {}: {}", connection_id, e);
        }
        RelayOutcome::Rejected
    }
}

fn relayed_or_ignored(delivery: Option<Delivery>) -> RelayOutcome {
    match delivery {
        Some(delivery) => RelayOutcome::Relayed(delivery),
        None => RelayOutcome::Ignored,
    }
}
