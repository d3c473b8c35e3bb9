mod support;

use application::HistoryStore;
use domain::{MessageText, RoomName, ServerEvent, UserId, Username};
use serde_json::json;

use support::TestServer;

#[tokio::test]
async fn health_endpoint_is_alive() {
    let server = TestServer::spawn().await;

    let response = reqwest::get(format!("http://{}/health", server.addr))
        .await
        .expect("health request");
    assert_eq!(response.status(), 200);

    server.shutdown();
}

#[tokio::test]
async fn handshake_without_valid_token_is_rejected() {
    let server = TestServer::spawn().await;

    // 缺少 token
    let url = format!("ws://{}/api/v1/ws", server.addr);
    assert!(
        tokio_tungstenite::connect_async(url).await.is_err(),
        "WebSocket connection should fail without token"
    );

    // 伪造 token
    assert!(
        tokio_tungstenite::connect_async(server.ws_url("invalid-token"))
            .await
            .is_err(),
        "WebSocket connection should fail with invalid token"
    );

    // 过期 token
    let expired_signer = infrastructure::JwtIdentityVerifier::new(config::JwtConfig {
        secret: support::TEST_SECRET.to_string(),
        expiration_hours: -2,
    });
    let expired = expired_signer
        .issue_token(&TestServer::identity("u1", "alice"))
        .unwrap();
    assert!(
        tokio_tungstenite::connect_async(server.ws_url(&expired))
            .await
            .is_err(),
        "WebSocket connection should fail with expired token"
    );

    server.shutdown();
}

#[tokio::test]
async fn connect_join_and_room_broadcast_flow() {
    let server = TestServer::spawn().await;

    // alice 建连：先收到包含自己的在线列表，再收到默认房间历史
    let mut alice = server.connect(&server.token_for("u1", "alice")).await;
    match alice.recv_event().await {
        ServerEvent::OnlineUsers { users } => {
            assert_eq!(users.len(), 1);
            assert_eq!(users[0].id, UserId::parse("u1").unwrap());
            assert_eq!(users[0].username, Username::parse("alice").unwrap());
        }
        other => panic!("unexpected event {other:?}"),
    }
    match alice.recv_event().await {
        ServerEvent::ChatHistory { messages } => assert!(messages.is_empty()),
        other => panic!("unexpected event {other:?}"),
    }

    // bob 建连：自己收到两人在线列表和历史，alice 收到在线列表更新
    let mut bob = server.connect(&server.token_for("u2", "bob")).await;
    match bob.recv_event().await {
        ServerEvent::OnlineUsers { users } => assert_eq!(users.len(), 2),
        other => panic!("unexpected event {other:?}"),
    }
    assert!(matches!(
        bob.recv_event().await,
        ServerEvent::ChatHistory { .. }
    ));
    match alice.recv_event().await {
        ServerEvent::OnlineUsers { users } => assert_eq!(users.len(), 2),
        other => panic!("unexpected event {other:?}"),
    }

    // bob 发房间消息：alice 和 bob 自己都收到广播
    bob.send_json(json!({"type": "send-room", "text": "hi", "room": "general"}))
        .await;
    match alice.recv_event().await {
        ServerEvent::ReceiveMessage { message } => {
            assert_eq!(message.text.as_str(), "hi");
            assert_eq!(message.from_user_id, UserId::parse("u2").unwrap());
            assert_eq!(message.from_username, Username::parse("bob").unwrap());
            assert!(message.created_at.is_some());
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(matches!(
        bob.recv_event().await,
        ServerEvent::ReceiveMessage { .. }
    ));

    // 空白正文：无任何广播，也不落盘
    alice
        .send_json(json!({"type": "send-room", "text": "   "}))
        .await;
    bob.expect_silence().await;

    let stored = server
        .history
        .recent_by_room(&RoomName::parse("general").unwrap(), 50)
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);

    server.shutdown();
}

#[tokio::test]
async fn room_switch_delivers_capped_history_and_scopes_broadcast() {
    let server = TestServer::spawn().await;

    // 预置 60 条 lobby 历史
    let seeder = TestServer::identity("u9", "seeder");
    for i in 0..60 {
        server
            .history
            .append(domain::MessageRecord::room_message(
                &seeder,
                RoomName::parse("lobby").unwrap(),
                MessageText::parse(format!("m{i}")).unwrap(),
            ))
            .await
            .unwrap();
    }

    let mut alice = server.connect(&server.token_for("u1", "alice")).await;
    alice.recv_until("chat-history").await;

    let mut bob = server.connect(&server.token_for("u2", "bob")).await;
    bob.recv_until("chat-history").await;
    alice.recv_until("online-users").await;

    // alice 切到 lobby：只有她收到 lobby 历史，最旧在前、上限 50 条
    alice
        .send_json(json!({"type": "join-room", "room": "lobby"}))
        .await;
    match alice.recv_until("chat-history").await {
        ServerEvent::ChatHistory { messages } => {
            assert_eq!(messages.len(), 50);
            assert_eq!(messages[0].text.as_str(), "m10");
            assert_eq!(messages[49].text.as_str(), "m59");
        }
        other => panic!("unexpected event {other:?}"),
    }

    // bob 还在 general，他的消息不应到达 lobby 里的 alice
    bob.send_json(json!({"type": "send-room", "text": "hello general"}))
        .await;
    assert!(matches!(
        bob.recv_event().await,
        ServerEvent::ReceiveMessage { .. }
    ));
    alice.expect_silence().await;

    // alice 切回 general：历史里能看到 bob 刚才的消息
    alice
        .send_json(json!({"type": "join-room", "room": "general"}))
        .await;
    match alice.recv_until("chat-history").await {
        ServerEvent::ChatHistory { messages } => {
            assert_eq!(messages.len(), 1);
            assert_eq!(messages[0].text.as_str(), "hello general");
        }
        other => panic!("unexpected event {other:?}"),
    }

    server.shutdown();
}
