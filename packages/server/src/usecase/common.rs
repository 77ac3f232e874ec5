//! UseCase 間で共有する配信処理と送信者解決

use crate::{
    domain::{ConnectionId, Member, MemberRegistry, MessagePusher},
    infrastructure::dto::ServerFrame,
};

use super::error::RelayError;

/// 1 回のファンアウトの結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// 送信できた宛先の数
    pub delivered: usize,
    /// 送信に失敗した宛先の数
    pub failed: usize,
}

impl Delivery {
    /// 宛先の総数
    pub fn attempted(&self) -> usize {
        self.delivered + self.failed
    }
}

/// `recipients` の全員に `frame` を送る。
///
/// 宛先ごとに独立して送信し、失敗しても残りの宛先への配信は続ける。
pub(crate) async fn fan_out(
    pusher: &dyn MessagePusher,
    recipients: &[Member],
    frame: &ServerFrame,
) -> Delivery {
    let json = frame.to_json();
    let mut delivery = Delivery::default();
    for recipient in recipients {
        match pusher.push(&recipient.connection_id, &json).await {
            Ok(()) => delivery.delivered += 1,
            Err(e) => {
                tracing::warn!(
                    "Failed to deliver to '{}' in room '{}': {}",
                    recipient.display_name,
                    recipient.room_id,
                    e
                );
                delivery.failed += 1;
            }
        }
    }
    delivery
}

/// 退出したメンバーを、元のルームに残っているメンバーへ通知する。
pub(crate) async fn announce_departure(
    registry: &dyn MemberRegistry,
    pusher: &dyn MessagePusher,
    member: &Member,
) -> Delivery {
    let recipients = registry.members_of(&member.room_id).await;
    let notice = ServerFrame::System {
        message: format!("{} left the room", member.display_name),
    };
    fan_out(pusher, &recipients, &notice).await
}

/// 送信者のメンバー情報を解決する。
///
/// 未参加なら `Ok(None)`。索引の不整合を検出した場合は接続を切断済みとして
/// 扱い、強制的に取り除いて退出を通知したうえで
/// `RelayError::InvariantViolation` を返す。
pub(crate) async fn resolve_sender(
    registry: &dyn MemberRegistry,
    pusher: &dyn MessagePusher,
    connection_id: &ConnectionId,
) -> Result<Option<Member>, RelayError> {
    match registry.find_by_connection(connection_id).await {
        Ok(member) => Ok(member),
        Err(e) => {
            tracing::error!("{}; force-removing connection {}", e, connection_id);
            if let Some(member) = registry.remove(connection_id).await {
                announce_departure(registry, pusher, &member).await;
            }
            Err(RelayError::InvariantViolation(*connection_id))
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! UseCase テスト用の共通フィクスチャ

    use std::sync::Arc;

    use tokio::sync::mpsc::UnboundedReceiver;

    use crate::{
        domain::{ConnectionId, ConnectionIdFactory},
        infrastructure::{
            connection::ConnectionTable, dto::ServerFrame, registry::InMemoryMemberRegistry,
        },
    };

    /// 実際の Registry と ConnectionTable を組み合わせたテスト環境
    pub(crate) struct Fixture {
        pub(crate) registry: Arc<InMemoryMemberRegistry>,
        pub(crate) connections: Arc<ConnectionTable>,
    }

    impl Fixture {
        pub(crate) fn new() -> Self {
            Self {
                registry: Arc::new(InMemoryMemberRegistry::new()),
                connections: Arc::new(ConnectionTable::new()),
            }
        }

        /// 新しい接続を開き、その受信側を返す
        pub(crate) async fn connect(&self) -> (ConnectionId, UnboundedReceiver<String>) {
            let id = ConnectionIdFactory::generate();
            let rx = self.connections.register(id).await;
            (id, rx)
        }
    }

    /// 受信済みのフレームを全て取り出す
    pub(crate) fn drain(rx: &mut UnboundedReceiver<String>) -> Vec<ServerFrame> {
        let mut frames = Vec::new();
        while let Ok(raw) = rx.try_recv() {
            frames.push(serde_json::from_str(&raw).expect("server frame"));
        }
        frames
    }

    pub(crate) fn system(message: &str) -> ServerFrame {
        ServerFrame::System {
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ConnectionIdFactory, DisplayName, MockMemberRegistry, MockMessagePusher, PushError,
        RegistryError, RoomId, Timestamp,
    };

    fn member(name: &str) -> Member {
        Member::new(
            ConnectionIdFactory::generate(),
            RoomId::new("abc123".to_string()).unwrap(),
            DisplayName::new(name.to_string()).unwrap(),
            Timestamp::new(1000),
        )
    }

    #[tokio::test]
    async fn test_fan_out_continues_after_failure() {
        // テスト項目: 1 人への送信失敗が残りの宛先への配信を止めない
        // given (前提条件):
        let alice = member("Alice");
        let bob = member("Bob");
        let carol = member("Carol");
        let bob_id = bob.connection_id;
        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_push()
            .times(3)
            .returning(move |id, _| {
                if *id == bob_id {
                    Err(PushError::ConnectionClosed(*id))
                } else {
                    Ok(())
                }
            });
        let frame = ServerFrame::System {
            message: "hello".to_string(),
        };

        // when (操作):
        let delivery = fan_out(&pusher, &[alice, bob, carol], &frame).await;

        // then (期待する結果):
        assert_eq!(
            delivery,
            Delivery {
                delivered: 2,
                failed: 1
            }
        );
        assert_eq!(delivery.attempted(), 3);
    }

    #[tokio::test]
    async fn test_resolve_sender_force_removes_on_inconsistency() {
        // テスト項目: 不整合を検出すると接続を強制削除してエラーを返す
        // given (前提条件):
        let id = ConnectionIdFactory::generate();
        let mut registry = MockMemberRegistry::new();
        registry
            .expect_find_by_connection()
            .times(1)
            .returning(|id| Err(RegistryError::Inconsistent(*id)));
        registry.expect_remove().times(1).returning(|_| None);
        let pusher = MockMessagePusher::new();

        // when (操作):
        let result = resolve_sender(&registry, &pusher, &id).await;

        // then (期待する結果):
        assert_eq!(result, Err(RelayError::InvariantViolation(id)));
    }

    #[tokio::test]
    async fn test_resolve_sender_announces_force_removed_member() {
        // テスト項目: 強制削除したメンバーの退出は残りのメンバーに通知される
        // given (前提条件):
        let alice = member("Alice");
        let bob = member("Bob");
        let alice_id = alice.connection_id;
        let bob_id = bob.connection_id;
        let mut registry = MockMemberRegistry::new();
        registry
            .expect_find_by_connection()
            .times(1)
            .returning(|id| Err(RegistryError::Inconsistent(*id)));
        registry
            .expect_remove()
            .times(1)
            .returning(move |_| Some(alice.clone()));
        registry
            .expect_members_of()
            .times(1)
            .returning(move |_| vec![bob.clone()]);
        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_push()
            .withf(move |id, frame| {
                *id == bob_id && frame.contains("Alice left the room")
            })
            .times(1)
            .returning(|_, _| Ok(()));

        // when (操作):
        let result = resolve_sender(&registry, &pusher, &alice_id).await;

        // then (期待する結果):
        assert_eq!(result, Err(RelayError::InvariantViolation(alice_id)));
    }

    #[tokio::test]
    async fn test_resolve_sender_unjoined_is_none() {
        // テスト項目: 未参加の接続は None に解決される
        // given (前提条件):
        let mut registry = MockMemberRegistry::new();
        registry
            .expect_find_by_connection()
            .returning(|_| Ok(None));
        registry.expect_remove().never();
        let pusher = MockMessagePusher::new();

        // when (操作):
        let result = resolve_sender(&registry, &pusher, &ConnectionIdFactory::generate()).await;

        // then (期待する結果):
        assert_eq!(result, Ok(None));
    }
}
