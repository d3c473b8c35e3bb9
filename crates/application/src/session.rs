use domain::{ConnectionId, Identity, RoomName};

use crate::delivery::ConnectionHandle;

/// 单个连接的会话记录
///
/// 由连接生命周期任务独占持有，事件处理统一经由它访问连接状态，
/// 连接状态不散落在各处回调里。
#[derive(Debug, Clone)]
pub struct ConnectionSession {
    pub identity: Identity,
    pub handle: ConnectionHandle,
    /// 当前所在房间；一个会话同一时刻至多属于一个房间
    pub current_room: Option<RoomName>,
}

impl ConnectionSession {
    pub fn new(identity: Identity, handle: ConnectionHandle) -> Self {
        Self {
            identity,
            handle,
            current_room: None,
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.handle.connection_id()
    }
}
