//! InMemory Member Registry 実装
//!
//! ドメイン層が定義する MemberRegistry trait の具体的な実装。
//! 接続 ID からメンバーを引くマップと、ルーム ID から接続 ID の列を引く
//! インデックスの 2 つを、1 つの Mutex の内側で同期して保持します。
//!
//! ルームは明示的に作成・削除されません。最初の参加でインデックスに現れ、
//! 最後のメンバーが抜けた時点でインデックスから消えます。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, DisplayName, Member, MemberRegistry, RegistryError, RoomId, RoomSummary,
    Timestamp,
};

#[derive(Debug, Default)]
struct Tables {
    /// 接続 ID → メンバー
    by_connection: HashMap<ConnectionId, Member>,
    /// ルーム ID → 参加順の接続 ID
    by_room: HashMap<RoomId, Vec<ConnectionId>>,
}

impl Tables {
    fn name_taken(&self, room_id: &RoomId, name: &DisplayName) -> bool {
        self.by_room.get(room_id).is_some_and(|connections| {
            connections.iter().any(|id| {
                self.by_connection
                    .get(id)
                    .is_some_and(|member| &member.display_name == name)
            })
        })
    }

    fn snapshot(&self, room_id: &RoomId, excluded: Option<&ConnectionId>) -> Vec<Member> {
        let Some(connections) = self.by_room.get(room_id) else {
            return Vec::new();
        };
        connections
            .iter()
            .filter_map(|id| self.by_connection.get(id))
            .filter(|member| excluded.is_none_or(|id| !member.is_connection(id)))
            .cloned()
            .collect()
    }

    fn detach_from_room(&mut self, room_id: &RoomId, connection_id: &ConnectionId) {
        if let Some(connections) = self.by_room.get_mut(room_id) {
            connections.retain(|id| id != connection_id);
            if connections.is_empty() {
                self.by_room.remove(room_id);
            }
        }
    }
}

/// インメモリ Member Registry 実装
///
/// 重複名チェックと挿入は同じロックの内側で行うため、同名メンバーが
/// 同じルームに 2 人存在する状態は起こりません。
#[derive(Debug, Default)]
pub struct InMemoryMemberRegistry {
    tables: Mutex<Tables>,
}

impl InMemoryMemberRegistry {
    /// 新しい InMemoryMemberRegistry を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemberRegistry for InMemoryMemberRegistry {
    async fn add(
        &self,
        connection_id: ConnectionId,
        room_id: RoomId,
        display_name: DisplayName,
        joined_at: Timestamp,
    ) -> Result<Member, RegistryError> {
        let mut tables = self.tables.lock().await;

        if let Some(existing) = tables.by_connection.get(&connection_id) {
            return Err(RegistryError::AlreadyJoined {
                connection_id,
                room_id: existing.room_id.clone(),
            });
        }
        if tables.name_taken(&room_id, &display_name) {
            return Err(RegistryError::DuplicateName {
                room_id,
                name: display_name,
            });
        }

        let member = Member::new(connection_id, room_id.clone(), display_name, joined_at);
        tables
            .by_room
            .entry(room_id)
            .or_default()
            .push(connection_id);
        tables.by_connection.insert(connection_id, member.clone());

        Ok(member)
    }

    async fn remove(&self, connection_id: &ConnectionId) -> Option<Member> {
        let mut tables = self.tables.lock().await;
        let member = tables.by_connection.remove(connection_id)?;
        tables.detach_from_room(&member.room_id, connection_id);
        Some(member)
    }

    async fn find_by_connection(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<Option<Member>, RegistryError> {
        let tables = self.tables.lock().await;
        let Some(member) = tables.by_connection.get(connection_id) else {
            return Ok(None);
        };

        let indexed = tables
            .by_room
            .get(&member.room_id)
            .is_some_and(|connections| connections.contains(connection_id));
        if !indexed {
            return Err(RegistryError::Inconsistent(*connection_id));
        }

        Ok(Some(member.clone()))
    }

    async fn members_of(&self, room_id: &RoomId) -> Vec<Member> {
        let tables = self.tables.lock().await;
        tables.snapshot(room_id, None)
    }

    async fn members_of_except(&self, room_id: &RoomId, excluded: &ConnectionId) -> Vec<Member> {
        let tables = self.tables.lock().await;
        tables.snapshot(room_id, Some(excluded))
    }

    async fn list_rooms(&self) -> Vec<RoomSummary> {
        let tables = self.tables.lock().await;
        let mut rooms: Vec<RoomSummary> = tables
            .by_room
            .keys()
            .map(|room_id| RoomSummary {
                id: room_id.clone(),
                members: tables.snapshot(room_id, None),
            })
            .collect();

        // Sort by room id for consistent ordering
        rooms.sort_by(|a, b| a.id.cmp(&b.id));

        rooms
    }

    async fn count_members(&self) -> usize {
        let tables = self.tables.lock().await;
        tables.by_connection.len()
    }
}

#[cfg(test)]
impl InMemoryMemberRegistry {
    /// ルームインデックスだけから接続を外し、不整合な状態を作る（テスト専用）
    pub(crate) async fn corrupt_room_index(&self, connection_id: &ConnectionId) {
        let mut tables = self.tables.lock().await;
        if let Some(room_id) = tables
            .by_connection
            .get(connection_id)
            .map(|member| member.room_id.clone())
        {
            tables.detach_from_room(&room_id, connection_id);
        }
    }
}
