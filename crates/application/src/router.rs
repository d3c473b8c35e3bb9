//! 消息路由器
//!
//! 针对每种入站事件，向在线状态表 / 房间成员表解析收件集合并分发出站事件，
//! 并在需要时编排历史存储调用。发送路径采用先落盘、后分发：
//! 落盘失败只通知发起连接，不进行任何分发。

use std::sync::Arc;

use domain::{ClientEvent, MessageRecord, MessageText, RoomName, ServerEvent, UserId};

use crate::history::HistoryStore;
use crate::presence::PresenceTable;
use crate::rooms::RoomRegistry;
use crate::session::ConnectionSession;

pub struct MessageRouterDependencies {
    pub presence: Arc<PresenceTable>,
    pub rooms: Arc<RoomRegistry>,
    pub history: Arc<dyn HistoryStore>,
    /// 未指定房间时的缺省房间
    pub default_room: RoomName,
    /// 历史下发条数上限
    pub history_limit: u32,
}

pub struct MessageRouter {
    deps: MessageRouterDependencies,
}

impl MessageRouter {
    pub fn new(deps: MessageRouterDependencies) -> Self {
        Self { deps }
    }

    pub fn default_room(&self) -> &RoomName {
        &self.deps.default_room
    }

    /// 连接建立：注册在线表 → 加入默认房间 → 广播在线列表 → 下发历史
    ///
    /// 顺序约束：历史必须在入房完成之后下发；在线广播必须在注册完成之后，
    /// 且覆盖包括新连接在内的所有连接。
    pub async fn connect(&self, session: &mut ConnectionSession) {
        if let Some(displaced) = self
            .deps
            .presence
            .register(&session.identity, session.handle.clone())
            .await
        {
            // 旧连接保持打开并继续收到房间广播，但私信不再寻址到它
            tracing::warn!(
                user_id = %session.identity.user_id,
                displaced_connection = %displaced.handle.connection_id(),
                "用户重复连接，在线表条目被新连接覆盖"
            );
        }

        let room = self.deps.default_room.clone();
        self.deps
            .rooms
            .join(room.clone(), session.handle.clone())
            .await;
        session.current_room = Some(room.clone());

        self.broadcast_online_users().await;
        self.send_history(session, &room).await;

        tracing::info!(
            user_id = %session.identity.user_id,
            connection_id = %session.connection_id(),
            room = %room,
            "连接已加入默认房间"
        );
    }

    /// 处理一条入站事件
    pub async fn dispatch(&self, session: &mut ConnectionSession, event: ClientEvent) {
        match event {
            ClientEvent::JoinRoom { room } => self.join_room(session, room).await,
            ClientEvent::SendRoom { text, room } => self.send_room(session, text, room).await,
            ClientEvent::SendDirect { text, to_user_id } => {
                self.send_direct(session, text, to_user_id).await
            }
            ClientEvent::Typing { room, is_typing } => self.typing(session, room, is_typing).await,
            ClientEvent::TypingDirect {
                to_user_id,
                is_typing,
            } => self.typing_direct(session, to_user_id, is_typing).await,
        }
    }

    /// 加入/切换房间：原子换房后，仅向请求连接下发新房间历史
    pub async fn join_room(&self, session: &mut ConnectionSession, room: RoomName) {
        self.deps
            .rooms
            .join(room.clone(), session.handle.clone())
            .await;
        session.current_room = Some(room.clone());
        self.send_history(session, &room).await;

        tracing::debug!(
            user_id = %session.identity.user_id,
            room = %room,
            "连接切换房间"
        );
    }

    /// 发送房间消息：落盘成功后广播给房间内全部成员（含发送者）
    pub async fn send_room(
        &self,
        session: &ConnectionSession,
        text: String,
        room: Option<RoomName>,
    ) {
        let Ok(text) = MessageText::parse(text) else {
            // 空白正文按误触处理，静默丢弃
            tracing::debug!(user_id = %session.identity.user_id, "空白房间消息被丢弃");
            return;
        };
        let room = room.unwrap_or_else(|| self.deps.default_room.clone());

        let record = MessageRecord::room_message(&session.identity, room.clone(), text);
        let Some(stored) = self.append_or_report(session, record).await else {
            return;
        };

        for member in self.deps.rooms.members_of(&room).await {
            member.send(ServerEvent::ReceiveMessage {
                message: stored.clone(),
            });
        }
    }

    /// 发送私信：落盘成功后投递给收件人（在线时）并回显给发送者
    ///
    /// 收件人离线不是错误：消息照常落盘并回显，对方下次拉取历史可见。
    pub async fn send_direct(&self, session: &ConnectionSession, text: String, to_user_id: UserId) {
        let Ok(text) = MessageText::parse(text) else {
            tracing::debug!(user_id = %session.identity.user_id, "空白私信被丢弃");
            return;
        };

        let recipient = self.deps.presence.lookup(&to_user_id).await;
        let record = MessageRecord::direct_message(
            &session.identity,
            to_user_id.clone(),
            recipient.as_ref().map(|entry| entry.username.clone()),
            text,
        );
        let Some(stored) = self.append_or_report(session, record).await else {
            return;
        };

        if let Some(entry) = recipient {
            entry.handle.send(ServerEvent::PrivateMessage {
                message: stored.clone(),
            });
        } else {
            tracing::debug!(
                from = %session.identity.user_id,
                to = %to_user_id,
                "私信收件人离线，仅落盘"
            );
        }

        // 回显给发送者，让发送方界面立即看到这条消息
        session
            .handle
            .send(ServerEvent::PrivateMessage { message: stored });
    }

    /// 房间输入中指示：转发给房间内除发送者以外的成员，不落盘
    pub async fn typing(&self, session: &ConnectionSession, room: Option<RoomName>, is_typing: bool) {
        let room = room.unwrap_or_else(|| self.deps.default_room.clone());
        let sender = session.connection_id();

        for member in self.deps.rooms.members_of(&room).await {
            if member.connection_id() == sender {
                continue;
            }
            member.send(ServerEvent::Typing {
                username: session.identity.username.clone(),
                is_typing,
            });
        }
    }

    /// 私信输入中指示：仅投递给在线的收件人，不回显
    pub async fn typing_direct(
        &self,
        session: &ConnectionSession,
        to_user_id: UserId,
        is_typing: bool,
    ) {
        if let Some(entry) = self.deps.presence.lookup(&to_user_id).await {
            entry.handle.send(ServerEvent::TypingDirect {
                from_user_id: session.identity.user_id.clone(),
                from_username: session.identity.username.clone(),
                is_typing,
            });
        }
    }

    /// 连接断开：注销在线表与房间成员，向余下连接广播新的在线列表
    pub async fn disconnect(&self, session: &ConnectionSession) {
        let removed = self
            .deps
            .presence
            .deregister(&session.identity.user_id, session.connection_id())
            .await;
        if !removed {
            // 在线表条目已被同一用户的新连接接管
            tracing::debug!(
                user_id = %session.identity.user_id,
                connection_id = %session.connection_id(),
                "断开连接时在线表条目已属于新连接"
            );
        }
        self.deps.rooms.leave(session.connection_id()).await;
        self.broadcast_online_users().await;

        tracing::info!(
            user_id = %session.identity.user_id,
            connection_id = %session.connection_id(),
            "连接已断开并清理"
        );
    }

    /// 落盘一条消息；失败时只向发起连接发送一次 error 事件并放弃分发
    async fn append_or_report(
        &self,
        session: &ConnectionSession,
        record: MessageRecord,
    ) -> Option<MessageRecord> {
        match self.deps.history.append(record).await {
            Ok(stored) => Some(stored),
            Err(err) => {
                tracing::error!(
                    user_id = %session.identity.user_id,
                    error = %err,
                    "消息落盘失败，取消分发"
                );
                session.handle.send(ServerEvent::Error {
                    code: "SEND_FAILED".to_string(),
                    message: "message could not be persisted".to_string(),
                });
                None
            }
        }
    }

    async fn send_history(&self, session: &ConnectionSession, room: &RoomName) {
        match self
            .deps
            .history
            .recent_by_room(room, self.deps.history_limit)
            .await
        {
            Ok(messages) => {
                session.handle.send(ServerEvent::ChatHistory { messages });
            }
            Err(err) => {
                tracing::error!(room = %room, error = %err, "加载房间历史失败");
                session.handle.send(ServerEvent::Error {
                    code: "HISTORY_FAILED".to_string(),
                    message: "failed to load room history".to_string(),
                });
            }
        }
    }

    async fn broadcast_online_users(&self) {
        let users = self.deps.presence.snapshot().await;
        let event = ServerEvent::OnlineUsers { users };
        for handle in self.deps.rooms.all_handles().await {
            handle.send(event.clone());
        }
    }
}
