//! UseCase: 入力中通知
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - NotifyTypingUseCase::execute() メソッド
//! - 送信者を除いた同じルームのメンバーへの転送
//!
//! ### なぜこのテストが必要か
//! - 入力中通知が送信者本人に戻らないことを保証
//! - サーバー側ではタイムアウトを持たず、1 回の通知を 1 回転送するだけであることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：他のメンバーへの転送
//! - エッジケース：ルームに送信者しかいない、未参加の接続からの通知

use std::sync::Arc;

use crate::{
    domain::{ConnectionId, MemberRegistry, MessagePusher},
    infrastructure::dto::ServerFrame,
};

use super::{
    common::{Delivery, fan_out, resolve_sender},
    error::RelayError,
};

/// 入力中通知のユースケース
pub struct NotifyTypingUseCase {
    /// Registry（メンバー管理の抽象化）
    registry: Arc<dyn MemberRegistry>,
    /// 接続への送信口
    pusher: Arc<dyn MessagePusher>,
}

impl NotifyTypingUseCase {
    /// 新しい NotifyTypingUseCase を作成
    pub fn new(registry: Arc<dyn MemberRegistry>, pusher: Arc<dyn MessagePusher>) -> Self {
        Self { registry, pusher }
    }

    /// 入力中通知を実行
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Delivery))` - 転送の配信結果
    /// * `Ok(None)` - 送信者が未参加のため無視した
    /// * `Err(RelayError)` - Registry の不変条件違反
    pub async fn execute(&self, connection_id: ConnectionId) -> Result<Option<Delivery>, RelayError> {
        let Some(sender) = resolve_sender(self.registry.as_ref(), self.pusher.as_ref(), &connection_id).await? else {
            return Ok(None);
        };

        let recipients = self
            .registry
            .members_of_except(&sender.room_id, &connection_id)
            .await;
        let frame = ServerFrame::Typing {
            username: sender.display_name.into_string(),
        };

        Ok(Some(
            fan_out(self.pusher.as_ref(), &recipients, &frame).await,
        ))
    }
}
