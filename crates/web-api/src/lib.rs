//! Web API 层。
//!
//! 提供 Axum 路由，将 WebSocket 连接委托给应用层的会话协调核心。

mod error;
mod routes;
mod state;
mod ws_connection;

pub use routes::router;
pub use state::AppState;
