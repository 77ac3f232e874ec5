//! UseCase: ルーム参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - 参加処理（Registry への登録、参加通知のブロードキャスト、拒否時のエラー送信）
//!
//! ### なぜこのテストが必要か
//! - 同じルームでの表示名の重複を防ぐ
//! - 1 つの接続が 2 回参加できないことを保証
//! - 拒否時はリクエスト元だけにエラーが届き、ルームには何も流れないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規メンバーの参加（本人を含むルーム全員に通知）
//! - 異常系：同名での参加、参加済み接続の再参加

use std::sync::Arc;

use crate::{
    domain::{ConnectionId, DisplayName, Member, MemberRegistry, MessagePusher, RoomId, Timestamp},
    infrastructure::dto::ServerFrame,
};

use super::{
    common::{Delivery, fan_out},
    error::JoinError,
};

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    /// Registry（メンバー管理の抽象化）
    registry: Arc<dyn MemberRegistry>,
    /// 接続への送信口
    pusher: Arc<dyn MessagePusher>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(registry: Arc<dyn MemberRegistry>, pusher: Arc<dyn MessagePusher>) -> Self {
        Self { registry, pusher }
    }

    /// ルーム参加を実行
    ///
    /// 成功時はルーム全員（本人を含む）に `"<name> joined the room"` を送る。
    /// 失敗時はリクエスト元にだけ `error` フレームを送り、ルームは変化しない。
    ///
    /// # Returns
    ///
    /// * `Ok((Member, Delivery))` - 登録されたメンバーと参加通知の配信結果
    /// * `Err(JoinError)` - 参加拒否
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        room_id: RoomId,
        display_name: DisplayName,
    ) -> Result<(Member, Delivery), JoinError> {
        // 1. Registry に登録（重複チェックと挿入は Registry 内で原子的に行われる）
        let member = match self
            .registry
            .add(connection_id, room_id, display_name, Timestamp::now())
            .await
        {
            Ok(member) => member,
            Err(e) => {
                let error = JoinError::from(e);
                self.reject(&connection_id, &error).await;
                return Err(error);
            }
        };

        // 2. 参加通知をルーム全員へ
        let recipients = self.registry.members_of(&member.room_id).await;
        let notice = ServerFrame::System {
            message: format!("{} joined the room", member.display_name),
        };
        let delivery = fan_out(self.pusher.as_ref(), &recipients, &notice).await;

        Ok((member, delivery))
    }

    async fn reject(&self, connection_id: &ConnectionId, error: &JoinError) {
        let frame = ServerFrame::Error {
            message: error.to_string(),
        };
        if let Err(e) = self.pusher.push(connection_id, &frame.to_json()).await {
            tracing::warn!("Failed to send join rejection to {}: {}", connection_id, e);
        }
    }
}
