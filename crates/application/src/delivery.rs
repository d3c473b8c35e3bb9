use domain::{ConnectionId, ServerEvent};
use tokio::sync::mpsc;

/// 单个连接的投递句柄
///
/// 路由器通过句柄把出站事件推给对应连接的发送任务。
/// 无界通道保证同一接收者的事件先进先出；发送不阻塞，
/// 连接已关闭时事件被丢弃。
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    connection_id: ConnectionId,
    sender: mpsc::UnboundedSender<ServerEvent>,
}

impl ConnectionHandle {
    pub fn new(connection_id: ConnectionId, sender: mpsc::UnboundedSender<ServerEvent>) -> Self {
        Self {
            connection_id,
            sender,
        }
    }

    /// 创建句柄及其配套的接收端
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ServerEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(ConnectionId::new(), sender), receiver)
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// 推送一条出站事件；连接已关闭时返回 false
    pub fn send(&self, event: ServerEvent) -> bool {
        if self.sender.send(event).is_err() {
            tracing::debug!(
                connection_id = %self.connection_id,
                "connection channel closed, outbound event dropped"
            );
            return false;
        }
        true
    }
}
