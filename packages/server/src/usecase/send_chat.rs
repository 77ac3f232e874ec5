//! UseCase: チャット送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendChatUseCase::execute() メソッド
//! - 送信者の解決と、送信者を含むルーム全員へのブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 同じルームの全員（送信者本人を含む）に届き、他のルームには届かないことを保証
//! - 未参加の接続からのチャットは黙って無視されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：ルーム内へのブロードキャスト
//! - エッジケース：未参加の接続からの送信、宛先の 1 人が切断済み

use std::sync::Arc;

use crate::{
    domain::{ConnectionId, MemberRegistry, MessageContent, MessagePusher},
    infrastructure::dto::ServerFrame,
};

use super::{
    common::{Delivery, fan_out, resolve_sender},
    error::RelayError,
};

/// チャット送信のユースケース
pub struct SendChatUseCase {
    /// Registry（メンバー管理の抽象化）
    registry: Arc<dyn MemberRegistry>,
    /// 接続への送信口
    pusher: Arc<dyn MessagePusher>,
}

impl SendChatUseCase {
    /// 新しい SendChatUseCase を作成
    pub fn new(registry: Arc<dyn MemberRegistry>, pusher: Arc<dyn MessagePusher>) -> Self {
        Self { registry, pusher }
    }

    /// チャット送信を実行
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Delivery))` - ブロードキャストの配信結果
    /// * `Ok(None)` - 送信者が未参加のため無視した
    /// * `Err(RelayError)` - Registry の不変条件違反
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        content: MessageContent,
    ) -> Result<Option<Delivery>, RelayError> {
        // 1. 送信者を解決
        let Some(sender) = resolve_sender(self.registry.as_ref(), self.pusher.as_ref(), &connection_id).await? else {
            return Ok(None);
        };

        // 2. 送信者を含むルーム全員へ
        let recipients = self.registry.members_of(&sender.room_id).await;
        let frame = ServerFrame::Chat {
            sender: sender.display_name.into_string(),
            message: content.into_string(),
        };

        Ok(Some(
            fan_out(self.pusher.as_ref(), &recipients, &frame).await,
        ))
    }
}
