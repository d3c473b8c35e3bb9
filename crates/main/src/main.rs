//! 主应用程序入口
//!
//! 组装会话协调核心并启动 Axum Web API 服务。

use std::sync::Arc;

use application::{
    Clock, HistoryStore, MessageRouter, MessageRouterDependencies, PresenceTable, RoomRegistry,
    SystemClock,
};
use config::AppConfig;
use domain::RoomName;
use infrastructure::{JwtIdentityVerifier, MemoryHistoryStore};
use tracing_subscriber::EnvFilter;
use web_api::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 读取并校验配置
    let config = AppConfig::from_env_with_defaults();
    config.validate()?;
    let default_room = RoomName::parse(config.chat.default_room.clone())?;

    // 组装核心：在线表、房间成员表、历史存储、消息路由
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let history = Arc::new(MemoryHistoryStore::new(clock)) as Arc<dyn HistoryStore>;
    let message_router = Arc::new(MessageRouter::new(MessageRouterDependencies {
        presence: Arc::new(PresenceTable::new()),
        rooms: Arc::new(RoomRegistry::new()),
        history,
        default_room,
        history_limit: config.chat.history_limit,
    }));

    // 身份校验器：凭据签发（注册/登录）由外部服务负责
    let identity_verifier = Arc::new(JwtIdentityVerifier::new(config.jwt.clone()));

    // 创建应用状态并启动 Web 服务器
    let state = AppState::new(identity_verifier, message_router);
    let app = router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("聊天服务器启动在 http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
