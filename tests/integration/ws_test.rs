//! WebSocket connection, live delivery and rejection.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use uuid::Uuid;

use crate::helpers::{TestApp, like_event};

async fn serve(app: &TestApp) -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app.router.clone();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

async fn next_json<S>(stream: &mut S) -> Value
where
    S: futures::Stream<Item = Result<Message, WsError>> + Unpin,
{
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("Timed out waiting for a frame")
            .expect("Stream ended")
            .expect("Socket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

#[tokio::test]
async fn test_connected_then_live_event_delivery() {
    let app = TestApp::new();
    let addr = serve(&app).await;
    let (owner, token) = app.user("owner");

    let (mut socket, _) = connect_async(format!("ws://{addr}/ws?token={token}"))
        .await
        .unwrap();

    let hello = next_json(&mut socket).await;
    assert_eq!(hello["type"], "system");
    assert_eq!(hello["payload"]["event"], "connected");

    let report = app
        .post_event(like_event(Uuid::new_v4(), "bea", owner, Uuid::new_v4()))
        .await;
    assert_eq!(report.body["data"]["delivered"], 1);
    // Delivered live, so nothing lands in the durable feed.
    assert_eq!(report.body["data"]["persisted"], 0);

    let frame = next_json(&mut socket).await;
    assert_eq!(frame["type"], "post_liked");
    assert_eq!(frame["payload"]["actor"]["name"], "bea");
    assert!(frame["timestamp"].is_string());
}

#[tokio::test]
async fn test_upgrade_without_token_is_rejected() {
    let app = TestApp::new();
    let addr = serve(&app).await;

    match connect_async(format!("ws://{addr}/ws")).await {
        Err(WsError::Http(response)) => assert_eq!(response.status().as_u16(), 401),
        Err(other) => panic!("unexpected error {other}"),
        Ok(_) => panic!("upgrade without a token must fail"),
    }
}

#[tokio::test]
async fn test_invalid_frame_gets_error_and_socket_stays_open() {
    let app = TestApp::new();
    let addr = serve(&app).await;
    let (_, token) = app.user("owner");

    let (mut socket, _) = connect_async(format!("ws://{addr}/ws?token={token}"))
        .await
        .unwrap();
    let _hello = next_json(&mut socket).await;

    socket
        .send(Message::Text("{\"type\":\"teleport\"}".into()))
        .await
        .unwrap();
    let error = next_json(&mut socket).await;
    assert_eq!(error["type"], "error");
    assert_eq!(error["payload"]["code"], "invalid_message");

    socket
        .send(Message::Text("{\"type\":\"ping\",\"payload\":{\"client_time\":7}}".into()))
        .await
        .unwrap();
    let pong = next_json(&mut socket).await;
    assert_eq!(pong["type"], "pong");
    assert_eq!(pong["payload"]["client_time"], 7);
}
