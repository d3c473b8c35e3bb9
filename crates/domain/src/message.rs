use serde::{Deserialize, Serialize};

use crate::identity::Identity;
use crate::value_objects::{MessageText, RoomName, Timestamp, UserId, Username};

/// 消息去向：房间广播或定向私信，二者必居其一。
///
/// 用和类型表达判别式，"既有房间又有收件人"在类型上就不可构造。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum MessageTarget {
    Room {
        room: RoomName,
    },
    Direct {
        to_user_id: UserId,
        /// 发送时收件人不在线则为 None
        to_username: Option<Username>,
    },
}

/// 一条已发送的聊天消息
///
/// 由路由器在发送时构造，经历史存储落盘后不再变更。
/// `created_at` 为空时由存储在落盘时补齐。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub from_user_id: UserId,
    pub from_username: Username,
    #[serde(flatten)]
    pub target: MessageTarget,
    pub text: MessageText,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

impl MessageRecord {
    /// 构造房间消息
    pub fn room_message(sender: &Identity, room: RoomName, text: MessageText) -> Self {
        Self {
            from_user_id: sender.user_id.clone(),
            from_username: sender.username.clone(),
            target: MessageTarget::Room { room },
            text,
            created_at: None,
        }
    }

    /// 构造私信消息
    pub fn direct_message(
        sender: &Identity,
        to_user_id: UserId,
        to_username: Option<Username>,
        text: MessageText,
    ) -> Self {
        Self {
            from_user_id: sender.user_id.clone(),
            from_username: sender.username.clone(),
            target: MessageTarget::Direct {
                to_user_id,
                to_username,
            },
            text,
            created_at: None,
        }
    }

    pub fn room(&self) -> Option<&RoomName> {
        match &self.target {
            MessageTarget::Room { room } => Some(room),
            MessageTarget::Direct { .. } => None,
        }
    }

    /// 是否为 a 与 b 之间（任一方向）的私信
    pub fn is_direct_between(&self, a: &UserId, b: &UserId) -> bool {
        match &self.target {
            MessageTarget::Direct { to_user_id, .. } => {
                (&self.from_user_id == a && to_user_id == b)
                    || (&self.from_user_id == b && to_user_id == a)
            }
            MessageTarget::Room { .. } => false,
        }
    }
}
