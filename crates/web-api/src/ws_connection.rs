//! WebSocket 连接管理
//!
//! 驱动单个连接的完整会话生命周期：
//! 校验通过 → 注册在线表并加入默认房间 → 下发历史 →
//! 循环处理入站事件 → 断开时注销并广播在线列表。

use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use application::{ConnectionHandle, ConnectionSession};
use domain::{ClientEvent, Identity, ServerEvent};

use crate::state::AppState;

/// WebSocket 写操作命令
///
/// 接收路径产生的写操作（pong 回应）经由命令通道，
/// 与路由器推送的出站事件在同一个发送任务里串行执行。
#[derive(Debug)]
enum WsCommand {
    SendPong(Vec<u8>),
}

pub struct WsConnection;

impl WsConnection {
    /// 运行连接的完整生命周期；身份已在升级前校验完成
    pub async fn run(socket: WebSocket, state: AppState, identity: Identity) {
        let (handle, mut event_rx) = ConnectionHandle::channel();
        let connection_id = handle.connection_id();
        let mut session = ConnectionSession::new(identity, handle);

        tracing::info!(
            user_id = %session.identity.user_id,
            connection_id = %connection_id,
            "WebSocket 连接已建立"
        );

        // 注册在线表、加入默认房间、广播在线列表、下发历史
        state.message_router.connect(&mut session).await;

        let (mut sender, mut incoming) = socket.split();
        let (cmd_tx, mut cmd_rx) = mpsc::channel::<WsCommand>(32);

        // 发送任务：统一处理所有对 WebSocket sender 的写操作
        let send_task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    cmd = cmd_rx.recv() => {
                        let Some(cmd) = cmd else { break };
                        match cmd {
                            WsCommand::SendPong(data) => {
                                if sender.send(WsMessage::Pong(data.into())).await.is_err() {
                                    tracing::warn!("Failed to send pong message");
                                    break;
                                }
                            }
                        }
                    }
                    event = event_rx.recv() => {
                        let Some(event) = event else { break };
                        if Self::send_event(&mut sender, event).await.is_err() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!(connection_id = %connection_id, "WebSocket 发送任务结束");
        });

        // 接收循环跑在会话任务本身：入站事件严格按序处理，
        // 断开清理不可能与任何在途事件交错
        while let Some(Ok(message)) = incoming.next().await {
            match message {
                WsMessage::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => state.message_router.dispatch(&mut session, event).await,
                    Err(err) => {
                        // 无法解析的帧按校验失败处理，静默丢弃
                        tracing::debug!(
                            connection_id = %connection_id,
                            error = %err,
                            "丢弃无法解析的客户端事件"
                        );
                    }
                },
                WsMessage::Ping(data) => {
                    if cmd_tx.send(WsCommand::SendPong(data.to_vec())).await.is_err() {
                        break;
                    }
                }
                WsMessage::Pong(_) => {}
                WsMessage::Binary(_) => {
                    tracing::debug!("收到二进制帧（不支持）");
                }
                WsMessage::Close(_) => {
                    tracing::info!(connection_id = %connection_id, "WebSocket 收到关闭帧");
                    break;
                }
            }
        }

        // 注销在线表与房间成员，并向余下连接广播新的在线列表
        state.message_router.disconnect(&session).await;

        // 关闭出站通道，发送任务排空后自行退出
        drop(session);
        drop(cmd_tx);
        let _ = send_task.await;

        tracing::info!(connection_id = %connection_id, "WebSocket 连接已断开，状态已清理");
    }

    async fn send_event(
        sender: &mut SplitSink<WebSocket, WsMessage>,
        event: ServerEvent,
    ) -> Result<(), ()> {
        let payload = match serde_json::to_string(&event) {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!(error = %err, "failed to serialize websocket payload");
                return Ok(());
            }
        };
        if sender.send(WsMessage::Text(payload.into())).await.is_err() {
            tracing::warn!("Failed to send text message");
            return Err(());
        }
        Ok(())
    }
}
