//! UseCase 層
//!
//! ビジネスロジックを実装するレイヤー。
//! UI 層から呼び出され、Domain 層のポート（MemberRegistry / MessagePusher）を操作します。

pub mod common;
pub mod error;
pub mod join_room;
pub mod leave_room;
pub mod notify_typing;
pub mod relay;
pub mod send_chat;

pub use common::Delivery;
pub use error::{JoinError, LimitError, RelayError};
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use notify_typing::NotifyTypingUseCase;
pub use relay::{ConnectionPhase, RelayOutcome, RoomRelay};
pub use send_chat::SendChatUseCase;
