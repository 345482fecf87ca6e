//! Presence visibility over HTTP.

use axum::http::StatusCode;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_hidden_activity_status_reads_offline_to_others() {
    let app = TestApp::new();
    let (alice, alice_token) = app.user("alice");
    let (_, bob_token) = app.user("bob");
    let _registration = app.state.engine.connect(alice, "alice".into()).await.unwrap();

    let path = format!("/api/v1/users/{alice}/presence");
    let response = app.request("GET", &path, None, Some(&bob_token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["is_online"], true);

    let response = app
        .request(
            "PUT",
            "/api/v1/settings/activity-status",
            Some(serde_json::json!({ "show_activity_status": false })),
            Some(&alice_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["show_activity_status"], false);
    assert_eq!(response.body["data"]["show_last_active"], true);

    let response = app.request("GET", &path, None, Some(&bob_token)).await;
    assert_eq!(response.body["data"]["is_online"], false);
    assert_eq!(response.body["data"]["status"], "offline");

    // Users always see their own presence.
    let response = app.request("GET", &path, None, Some(&alice_token)).await;
    assert_eq!(response.body["data"]["is_online"], true);
}

#[tokio::test]
async fn test_custom_status_update() {
    let app = TestApp::new();
    let (alice, token) = app.user("alice");
    let _registration = app.state.engine.connect(alice, "alice".into()).await.unwrap();

    let response = app
        .request(
            "PUT",
            "/api/v1/presence/status",
            Some(serde_json::json!({
                "status": "in_studio",
                "custom_status": "mixing",
                "daw": "Ableton Live",
            })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "in_studio");
    assert_eq!(response.body["data"]["custom_status"], "mixing");
    assert_eq!(response.body["data"]["daw"], "Ableton Live");
}

#[tokio::test]
async fn test_bulk_presence_and_online_check() {
    let app = TestApp::new();
    let (_, viewer_token) = app.user("viewer");
    let (online, online_token) = app.user("online");
    let (hidden, hidden_token) = app.user("hidden");
    let (offline, _) = app.user("offline");
    let _online_conn = app.state.engine.connect(online, "online".into()).await.unwrap();
    let _hidden_conn = app.state.engine.connect(hidden, "hidden".into()).await.unwrap();
    app.request(
        "PUT",
        "/api/v1/settings/activity-status",
        Some(serde_json::json!({ "show_activity_status": false })),
        Some(&hidden_token),
    )
    .await;

    let ids = serde_json::json!({ "user_ids": [online, hidden, offline] });
    let response = app
        .request("POST", "/api/v1/presence/bulk", Some(ids.clone()), Some(&viewer_token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["online_count"], 1);
    let presence = response.body["data"]["presence"].as_array().unwrap();
    assert_eq!(presence.len(), 3);
    assert_eq!(presence[0]["user_id"], online.to_string());
    assert_eq!(presence[0]["is_online"], true);
    assert_eq!(presence[1]["is_online"], false);

    let response = app
        .request("POST", "/api/v1/ws/online", Some(ids), Some(&viewer_token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let statuses = &response.body["data"]["statuses"];
    assert_eq!(statuses[online.to_string()], true);
    assert_eq!(statuses[hidden.to_string()], false);
    assert_eq!(statuses[offline.to_string()], false);

    // Hidden users still see themselves online.
    let response = app
        .request(
            "POST",
            "/api/v1/ws/online",
            Some(serde_json::json!({ "user_ids": [hidden] })),
            Some(&hidden_token),
        )
        .await;
    assert_eq!(response.body["data"]["statuses"][hidden.to_string()], true);

    let response = app
        .request(
            "POST",
            "/api/v1/presence/bulk",
            Some(serde_json::json!({ "user_ids": [] })),
            Some(&online_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_friends_in_studio() {
    let app = TestApp::new();
    let (viewer, viewer_token) = app.user("viewer");
    let (producer, producer_token) = app.user("producer");
    let (listener, _) = app.user("listener");
    app.social.follow(viewer, producer);
    app.social.follow(viewer, listener);
    let _producer_conn = app.state.engine.connect(producer, "producer".into()).await.unwrap();
    let _listener_conn = app.state.engine.connect(listener, "listener".into()).await.unwrap();

    app.request(
        "PUT",
        "/api/v1/presence/status",
        Some(serde_json::json!({ "status": "in_studio", "daw": "FL Studio" })),
        Some(&producer_token),
    )
    .await;

    let response = app
        .request("GET", "/api/v1/presence/friends-in-studio", None, Some(&viewer_token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["count"], 1);
    let friend = &response.body["data"]["friends"][0];
    assert_eq!(friend["user_id"], producer.to_string());
    assert_eq!(friend["username"], "producer");
    assert_eq!(friend["daw"], "FL Studio");
}

#[tokio::test]
async fn test_ws_metrics_count_sends_and_drops() {
    let app = TestApp::new();
    let (user, token) = app.user("metrics");
    let _registration = app.state.engine.connect(user, "metrics".into()).await.unwrap();

    let response = app.request("GET", "/api/v1/ws/metrics", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    let websocket = &response.body["data"]["websocket"];
    assert_eq!(websocket["active_connections"], 1);
    assert_eq!(websocket["online_users"], 1);
    assert_eq!(websocket["total_connections"], 1);
    assert!(websocket["messages_dropped"].is_u64());

    let response = app.request("GET", "/api/v1/ws/metrics", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}
