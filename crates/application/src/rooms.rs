use std::collections::HashMap;

use domain::{ConnectionId, RoomName};
use tokio::sync::RwLock;

use crate::delivery::ConnectionHandle;

#[derive(Debug, Default)]
struct RoomsInner {
    rooms: HashMap<RoomName, HashMap<ConnectionId, ConnectionHandle>>,
    by_connection: HashMap<ConnectionId, RoomName>,
}

/// 房间成员表
///
/// room → 连接句柄集合的并发安全映射；一个连接同一时刻至多出现在一个房间。
/// `join` 在同一临界区内完成"先离开旧房间、再进入新房间"，
/// 外部观察不到连接同时属于零个或两个房间的状态。
#[derive(Debug, Default)]
pub struct RoomRegistry {
    inner: RwLock<RoomsInner>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 把连接移入 `room`，自动离开它之前所在的房间
    pub async fn join(&self, room: RoomName, handle: ConnectionHandle) {
        let mut inner = self.inner.write().await;
        let connection_id = handle.connection_id();

        if let Some(previous) = inner.by_connection.remove(&connection_id) {
            if let Some(members) = inner.rooms.get_mut(&previous) {
                members.remove(&connection_id);
                if members.is_empty() {
                    inner.rooms.remove(&previous);
                }
            }
        }

        inner
            .rooms
            .entry(room.clone())
            .or_default()
            .insert(connection_id, handle);
        inner.by_connection.insert(connection_id, room);
    }

    /// 把连接移出当前所在房间（不在任何房间时为空操作）
    pub async fn leave(&self, connection_id: ConnectionId) {
        let mut inner = self.inner.write().await;
        if let Some(room) = inner.by_connection.remove(&connection_id) {
            if let Some(members) = inner.rooms.get_mut(&room) {
                members.remove(&connection_id);
                if members.is_empty() {
                    inner.rooms.remove(&room);
                }
            }
        }
    }

    /// 房间成员快照；返回后立即可能过期，调用方不得缓存
    pub async fn members_of(&self, room: &RoomName) -> Vec<ConnectionHandle> {
        let inner = self.inner.read().await;
        inner
            .rooms
            .get(room)
            .map(|members| members.values().cloned().collect())
            .unwrap_or_default()
    }

    /// 连接当前所在的房间
    pub async fn room_of(&self, connection_id: ConnectionId) -> Option<RoomName> {
        let inner = self.inner.read().await;
        inner.by_connection.get(&connection_id).cloned()
    }

    /// 所有房间内全部连接的快照，用于全服广播
    pub async fn all_handles(&self) -> Vec<ConnectionHandle> {
        let inner = self.inner.read().await;
        inner
            .rooms
            .values()
            .flat_map(|members| members.values().cloned())
            .collect()
    }
}
