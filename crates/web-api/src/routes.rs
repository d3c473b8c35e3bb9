use axum::{
    extract::{ws::WebSocketUpgrade, Query, State},
    http::StatusCode,
    response::Response,
    routing::get,
    Router,
};
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{error::ApiError, state::AppState, ws_connection::WsConnection};

#[derive(Debug, Deserialize)]
struct WsQuery {
    token: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new().route("/ws", get(websocket_upgrade))
}

async fn health() -> StatusCode {
    StatusCode::OK
}

/// WebSocket 升级入口
///
/// 凭据通过 `token` 查询参数随握手带入，独立于事件流。
/// 校验不通过的连接在升级前即被拒绝，不会进入会话生命周期。
async fn websocket_upgrade(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let Some(token) = query.token else {
        tracing::warn!("WebSocket 握手缺少凭据");
        return Err(ApiError::unauthorized("missing token"));
    };

    let identity = state
        .identity_verifier
        .verify(&token)
        .await
        .map_err(|err| {
            tracing::warn!(error = %err, "WebSocket 握手凭据校验失败");
            ApiError::from(err)
        })?;

    Ok(ws.on_upgrade(move |socket| WsConnection::run(socket, state, identity)))
}
