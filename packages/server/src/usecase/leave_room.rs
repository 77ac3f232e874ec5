//! UseCase: 退出処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - LeaveRoomUseCase::execute() メソッド
//! - 接続終了時の Registry からの削除と退出通知
//!
//! ### なぜこのテストが必要か
//! - 切断した接続にそれ以降のメッセージが届かないことを保証
//! - 切断通知が重複しても退出通知は 1 回だけであることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加中メンバーの退出
//! - エッジケース：未参加の接続の切断、切断通知の重複

use std::sync::Arc;

use crate::domain::{ConnectionId, Member, MemberRegistry, MessagePusher};

use super::common::{Delivery, announce_departure};

/// 退出のユースケース
pub struct LeaveRoomUseCase {
    /// Registry（メンバー管理の抽象化）
    registry: Arc<dyn MemberRegistry>,
    /// 接続への送信口
    pusher: Arc<dyn MessagePusher>,
}

impl LeaveRoomUseCase {
    /// 新しい LeaveRoomUseCase を作成
    pub fn new(registry: Arc<dyn MemberRegistry>, pusher: Arc<dyn MessagePusher>) -> Self {
        Self { registry, pusher }
    }

    /// 退出を実行
    ///
    /// # Returns
    ///
    /// * `Some((Member, Delivery))` - 削除したメンバーと退出通知の配信結果
    /// * `None` - 未参加または削除済み（通知なし）
    pub async fn execute(&self, connection_id: &ConnectionId) -> Option<(Member, Delivery)> {
        // 1. Registry から削除（以降のブロードキャスト対象から外れる）
        let member = self.registry.remove(connection_id).await?;

        // 2. 残ったメンバーへ退出通知
        let delivery =
            announce_departure(self.registry.as_ref(), self.pusher.as_ref(), &member).await;

        Some((member, delivery))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{DisplayName, RoomId, Timestamp},
        usecase::common::test_support::{Fixture, drain, system},
    };

    async fn join(fixture: &Fixture, id: ConnectionId, room: &str, name: &str) {
        fixture
            .registry
            .add(
                id,
                RoomId::new(room.to_string()).unwrap(),
                DisplayName::new(name.to_string()).unwrap(),
                Timestamp::new(1000),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_leave_room_notifies_remaining_members() {
        // テスト項目: 退出すると残りのメンバーに通知され、本人には届かない
        // given (前提条件):
        let fixture = Fixture::new();
        let usecase = LeaveRoomUseCase::new(fixture.registry.clone(), fixture.connections.clone());
        let (alice, mut alice_rx) = fixture.connect().await;
        let (bob, mut bob_rx) = fixture.connect().await;
        join(&fixture, alice, "abc123", "Alice").await;
        join(&fixture, bob, "abc123", "Bob").await;

        // when (操作):
        let (member, delivery) = usecase.execute(&alice).await.unwrap();

        // then (期待する結果):
        assert_eq!(member.display_name.as_str(), "Alice");
        assert_eq!(delivery.delivered, 1);
        assert_eq!(drain(&mut bob_rx), vec![system("Alice left the room")]);
        assert!(drain(&mut alice_rx).is_empty());
        let room = RoomId::new("abc123".to_string()).unwrap();
        assert_eq!(fixture.registry.members_of(&room).await.len(), 1);
    }

    #[tokio::test]
    async fn test_leave_room_twice_notifies_once() {
        // テスト項目: 切断通知が重複しても退出通知は 1 回だけ
        // given (前提条件):
        let fixture = Fixture::new();
        let usecase = LeaveRoomUseCase::new(fixture.registry.clone(), fixture.connections.clone());
        let (alice, _alice_rx) = fixture.connect().await;
        let (bob, mut bob_rx) = fixture.connect().await;
        join(&fixture, alice, "abc123", "Alice").await;
        join(&fixture, bob, "abc123", "Bob").await;

        // when (操作):
        let first = usecase.execute(&alice).await;
        let second = usecase.execute(&alice).await;

        // then (期待する結果):
        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(drain(&mut bob_rx), vec![system("Alice left the room")]);
    }

    #[tokio::test]
    async fn test_leave_room_unjoined_connection_is_silent() {
        // テスト項目: 未参加の接続の切断では何も配信されない
        // given (前提条件):
        let fixture = Fixture::new();
        let usecase = LeaveRoomUseCase::new(fixture.registry.clone(), fixture.connections.clone());
        let (alice, _alice_rx) = fixture.connect().await;
        let (stranger, _stranger_rx) = fixture.connect().await;
        let (bob, mut bob_rx) = fixture.connect().await;
        join(&fixture, alice, "abc123", "Alice").await;
        join(&fixture, bob, "abc123", "Bob").await;

        // when (操作):
        let result = usecase.execute(&stranger).await;

        // then (期待する結果):
        assert!(result.is_none());
        assert!(drain(&mut bob_rx).is_empty());
    }
}
