use std::collections::HashMap;

use domain::{ConnectionId, Identity, OnlineUser, UserId, Username};
use tokio::sync::RwLock;

use crate::delivery::ConnectionHandle;

/// 在线表条目
#[derive(Debug, Clone)]
pub struct PresenceEntry {
    pub handle: ConnectionHandle,
    pub username: Username,
}

/// 在线状态表
///
/// user id → (连接句柄, 用户名) 的并发安全映射，"谁在线"的唯一事实来源。
/// 所有操作都在同一把锁内完成，彼此原子；并发调用不会观察到中间状态。
/// 表只暴露下列原子操作，不暴露底层映射。
#[derive(Debug, Default)]
pub struct PresenceTable {
    entries: RwLock<HashMap<UserId, PresenceEntry>>,
}

impl PresenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册连接；同一用户重复连接时覆盖旧条目并返回它（last-connected-wins）
    ///
    /// 被覆盖的旧连接保持打开，但不再能作为私信收件端寻址；
    /// 是否通知旧连接由调用方决定。
    pub async fn register(
        &self,
        identity: &Identity,
        handle: ConnectionHandle,
    ) -> Option<PresenceEntry> {
        let mut entries = self.entries.write().await;
        entries.insert(
            identity.user_id.clone(),
            PresenceEntry {
                handle,
                username: identity.username.clone(),
            },
        )
    }

    /// 注销连接；仅当条目仍指向该连接时移除
    ///
    /// 旧连接的迟到断开不能误删新连接的条目。返回是否实际移除。
    pub async fn deregister(&self, user_id: &UserId, connection_id: ConnectionId) -> bool {
        let mut entries = self.entries.write().await;
        match entries.get(user_id) {
            Some(entry) if entry.handle.connection_id() == connection_id => {
                entries.remove(user_id);
                true
            }
            _ => false,
        }
    }

    /// 在线用户快照，用于 online-users 广播
    pub async fn snapshot(&self) -> Vec<OnlineUser> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .map(|(id, entry)| OnlineUser {
                id: id.clone(),
                username: entry.username.clone(),
            })
            .collect()
    }

    /// 查找用户当前的在线条目
    pub async fn lookup(&self, user_id: &UserId) -> Option<PresenceEntry> {
        let entries = self.entries.read().await;
        entries.get(user_id).cloned()
    }
}
