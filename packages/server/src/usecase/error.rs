//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{ConnectionId, RegistryError, ValueObjectError};

/// 参加処理のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JoinError {
    /// 同じルームに同じ表示名のメンバーがいる
    #[error("Username already taken in this room")]
    DuplicateName,

    /// この接続は既にどこかのルームに参加している
    #[error("You have already joined a room")]
    AlreadyJoined,
}

impl From<RegistryError> for JoinError {
    fn from(error: RegistryError) -> Self {
        match error {
            RegistryError::DuplicateName { .. } => Self::DuplicateName,
            // 索引の片側にだけ残っている接続も、参加済みとして扱う
            RegistryError::AlreadyJoined { .. } | RegistryError::Inconsistent(_) => {
                Self::AlreadyJoined
            }
        }
    }
}

/// 業務上の上限を超えた入力（リクエスト元にだけ `error` を返す）
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LimitError {
    #[error("Room id cannot exceed {max} bytes")]
    RoomIdTooLong { max: usize },

    #[error("Username cannot exceed {max} bytes")]
    UsernameTooLong { max: usize },

    #[error("Message cannot exceed {max} bytes")]
    MessageTooLong { max: usize },
}

impl LimitError {
    /// 長さ超過のエラーだけを変換する。空文字などは `None`
    pub fn from_value_object(error: &ValueObjectError) -> Option<Self> {
        match *error {
            ValueObjectError::RoomIdTooLong { max, .. } => Some(Self::RoomIdTooLong { max }),
            ValueObjectError::DisplayNameTooLong { max, .. } => {
                Some(Self::UsernameTooLong { max })
            }
            ValueObjectError::MessageContentTooLong { max, .. } => {
                Some(Self::MessageTooLong { max })
            }
            ValueObjectError::RoomIdEmpty
            | ValueObjectError::DisplayNameEmpty
            | ValueObjectError::MessageContentEmpty => None,
        }
    }
}

/// Relay 処理のエラー（接続単位で致命的）
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// Registry の不変条件違反。該当接続は強制的に取り除かれた
    #[error("membership invariant violated for connection {0}")]
    InvariantViolation(ConnectionId),
}
