//! 客户端与服务端之间的线协议事件
//!
//! 事件名用 kebab-case 标签区分，载荷字段保持 camelCase，
//! 与既有客户端的协议约定一致。

use serde::{Deserialize, Serialize};

use crate::message::MessageRecord;
use crate::value_objects::{RoomName, UserId, Username};

/// 客户端入站事件
///
/// `text` 保持原始字符串：空白正文属于业务校验（静默丢弃），
/// 不应在反序列化阶段报错。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// 加入/切换房间
    JoinRoom { room: RoomName },
    /// 发送房间消息，缺省房间由服务端补默认值
    SendRoom {
        text: String,
        #[serde(default)]
        room: Option<RoomName>,
    },
    /// 发送私信
    SendDirect { text: String, to_user_id: UserId },
    /// 房间输入中指示
    Typing {
        #[serde(default)]
        room: Option<RoomName>,
        is_typing: bool,
    },
    /// 私信输入中指示
    TypingDirect { to_user_id: UserId, is_typing: bool },
}

/// 服务端出站事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// 房间历史，时间升序
    ChatHistory { messages: Vec<MessageRecord> },
    /// 房间消息广播
    ReceiveMessage { message: MessageRecord },
    /// 私信投递（发给收件人，同时回显给发送者）
    PrivateMessage { message: MessageRecord },
    /// 房间输入中指示（不含发送者自己）
    Typing { username: Username, is_typing: bool },
    /// 私信输入中指示
    TypingDirect {
        from_user_id: UserId,
        from_username: Username,
        is_typing: bool,
    },
    /// 在线用户全量快照
    OnlineUsers { users: Vec<OnlineUser> },
    /// 定向错误通知，只发给出错操作的发起连接
    Error { code: String, message: String },
}

impl ServerEvent {
    /// 获取事件类型名称
    pub fn event_type(&self) -> &'static str {
        match self {
            ServerEvent::ChatHistory { .. } => "chat-history",
            ServerEvent::ReceiveMessage { .. } => "receive-message",
            ServerEvent::PrivateMessage { .. } => "private-message",
            ServerEvent::Typing { .. } => "typing",
            ServerEvent::TypingDirect { .. } => "typing-direct",
            ServerEvent::OnlineUsers { .. } => "online-users",
            ServerEvent::Error { .. } => "error",
        }
    }
}

/// 在线用户快照条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnlineUser {
    pub id: UserId,
    pub username: Username,
}
