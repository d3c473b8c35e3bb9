use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio_tungstenite::{
    connect_async, tungstenite::Message as TungsteniteMessage, MaybeTlsStream, WebSocketStream,
};

use application::{
    HistoryStore, MessageRouter, MessageRouterDependencies, PresenceTable, RoomRegistry,
    SystemClock,
};
use config::JwtConfig;
use domain::{Identity, RoomName, ServerEvent, UserId, Username};
use infrastructure::{JwtIdentityVerifier, MemoryHistoryStore};
use web_api::{router, AppState};

pub const TEST_SECRET: &str = "integration-test-secret-key-32-chars!!";

/// 跑在随机端口上的完整服务实例，测试结束后显式关停
pub struct TestServer {
    pub addr: SocketAddr,
    pub history: Arc<MemoryHistoryStore>,
    pub verifier: Arc<JwtIdentityVerifier>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub async fn spawn() -> Self {
        let verifier = Arc::new(JwtIdentityVerifier::new(JwtConfig {
            secret: TEST_SECRET.to_string(),
            expiration_hours: 24,
        }));
        let history = Arc::new(MemoryHistoryStore::new(Arc::new(SystemClock)));

        let message_router = Arc::new(MessageRouter::new(MessageRouterDependencies {
            presence: Arc::new(PresenceTable::new()),
            rooms: Arc::new(RoomRegistry::new()),
            history: history.clone() as Arc<dyn HistoryStore>,
            default_room: RoomName::parse("general").unwrap(),
            history_limit: 50,
        }));

        let state = AppState::new(verifier.clone(), message_router);
        let app = router(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        Self {
            addr,
            history,
            verifier,
            shutdown: Some(shutdown_tx),
        }
    }

    pub fn identity(id: &str, name: &str) -> Identity {
        Identity::new(UserId::parse(id).unwrap(), Username::parse(name).unwrap())
    }

    pub fn token_for(&self, id: &str, name: &str) -> String {
        self.verifier
            .issue_token(&Self::identity(id, name))
            .expect("issue token")
    }

    pub fn ws_url(&self, token: &str) -> String {
        format!("ws://{}/api/v1/ws?token={}", self.addr, token)
    }

    pub async fn connect(&self, token: &str) -> WsClient {
        let (stream, _) = connect_async(self.ws_url(token)).await.expect("ws connect");
        WsClient { stream }
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// 测试用 WebSocket 客户端，按服务端事件粒度收发
pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    pub async fn send_json(&mut self, payload: serde_json::Value) {
        self.stream
            .send(TungsteniteMessage::Text(payload.to_string().into()))
            .await
            .expect("send event");
    }

    /// 接收下一条服务端事件（5 秒超时）
    pub async fn recv_event(&mut self) -> ServerEvent {
        loop {
            let message = tokio::time::timeout(Duration::from_secs(5), self.stream.next())
                .await
                .expect("timed out waiting for server event")
                .expect("ws stream ended")
                .expect("ws error");
            match message {
                TungsteniteMessage::Text(payload) => {
                    return serde_json::from_str(&payload).expect("parse server event");
                }
                TungsteniteMessage::Ping(_) | TungsteniteMessage::Pong(_) => continue,
                other => panic!("unexpected ws message {other:?}"),
            }
        }
    }

    /// 等待指定类型的事件，跳过中间的其他事件
    pub async fn recv_until(&mut self, event_type: &str) -> ServerEvent {
        for _ in 0..16 {
            let event = self.recv_event().await;
            if event.event_type() == event_type {
                return event;
            }
        }
        panic!("did not receive a {event_type} event");
    }

    /// 断言短窗口内没有任何事件到达
    pub async fn expect_silence(&mut self) {
        let result = tokio::time::timeout(Duration::from_millis(300), self.stream.next()).await;
        assert!(result.is_err(), "expected no event, got {result:?}");
    }

    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}
