//! Event ingress, aggregation, read state and preferences over HTTP.

use axum::http::StatusCode;
use uuid::Uuid;

use crate::helpers::{TestApp, like_event};

#[tokio::test]
async fn test_offline_likes_persist_and_aggregate() {
    let app = TestApp::new();
    let (owner, token) = app.user("owner");
    let post = Uuid::new_v4();

    for name in ["bea", "cal"] {
        let response = app
            .post_event(like_event(Uuid::new_v4(), name, owner, post))
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["data"]["persisted"], 1);
        assert_eq!(response.body["data"]["delivered"], 0);
    }

    let response = app
        .request("GET", "/api/v1/notifications", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let page = &response.body["data"];
    assert_eq!(page["unread"], 2);
    let groups = page["groups"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["verb"], "like");
    assert_eq!(groups[0]["actor_count"], 2);
    assert!(
        groups[0]["text"]
            .as_str()
            .unwrap()
            .ends_with("and 1 other liked your loop")
    );
}

#[tokio::test]
async fn test_poll_after_offline_event_sees_it() {
    let app = TestApp::new();
    let (owner, token) = app.user("owner");

    // Caches an empty first page.
    let before = app
        .request("GET", "/api/v1/notifications", None, Some(&token))
        .await;
    assert_eq!(before.body["data"]["groups"].as_array().unwrap().len(), 0);

    let response = app
        .post_event(like_event(Uuid::new_v4(), "bea", owner, Uuid::new_v4()))
        .await;
    assert_eq!(response.body["data"]["persisted"], 1);

    let after = app
        .request("GET", "/api/v1/notifications", None, Some(&token))
        .await;
    assert_eq!(after.body["data"]["unread"], 1);
    assert_eq!(after.body["data"]["groups"][0]["text"], "bea liked your loop");
}

#[tokio::test]
async fn test_mark_read_updates_cached_page() {
    let app = TestApp::new();
    let (owner, token) = app.user("owner");
    app.post_event(like_event(Uuid::new_v4(), "bea", owner, Uuid::new_v4()))
        .await;

    // Warm the page cache before changing read state.
    let before = app
        .request("GET", "/api/v1/notifications", None, Some(&token))
        .await;
    assert_eq!(before.body["data"]["groups"][0]["is_read"], false);

    let response = app
        .request("POST", "/api/v1/notifications/read", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["unread"], 0);
    assert_eq!(response.body["data"]["unseen"], 0);

    let after = app
        .request("GET", "/api/v1/notifications", None, Some(&token))
        .await;
    assert_eq!(after.body["data"]["unread"], 0);
    assert_eq!(after.body["data"]["groups"][0]["is_read"], true);
}

#[tokio::test]
async fn test_disabled_category_is_skipped() {
    let app = TestApp::new();
    let (owner, token) = app.user("owner");

    let response = app
        .request(
            "PUT",
            "/api/v1/notifications/preferences",
            Some(serde_json::json!({ "likes": false })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["likes"], false);
    assert_eq!(response.body["data"]["follows"], true);

    let report = app
        .post_event(like_event(Uuid::new_v4(), "bea", owner, Uuid::new_v4()))
        .await;
    assert_eq!(report.body["data"]["skipped_disabled"], 1);
    assert_eq!(report.body["data"]["persisted"], 0);
}

#[tokio::test]
async fn test_unknown_preference_category_is_rejected() {
    let app = TestApp::new();
    let (_, token) = app.user("owner");

    let response = app
        .request(
            "PUT",
            "/api/v1/notifications/preferences",
            Some(serde_json::json!({ "carrier_pigeons": false })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION");
}

#[tokio::test]
async fn test_muted_actor_is_skipped() {
    let app = TestApp::new();
    let (owner, _) = app.user("owner");
    let troll = Uuid::new_v4();
    app.social.mute(owner, troll);

    let report = app
        .post_event(like_event(troll, "troll", owner, Uuid::new_v4()))
        .await;
    assert_eq!(report.body["data"]["skipped_muted"], 1);
}

#[tokio::test]
async fn test_event_ingress_requires_internal_token() {
    let app = TestApp::new();
    let (owner, token) = app.user("owner");

    // A user token is not an internal credential.
    let response = app
        .request(
            "POST",
            "/api/v1/events",
            Some(like_event(Uuid::new_v4(), "bea", owner, Uuid::new_v4())),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_notifications_require_authentication() {
    let app = TestApp::new();
    let response = app
        .request("GET", "/api/v1/notifications", None, None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request("GET", "/api/v1/notifications", None, Some("not-a-jwt"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();
    let response = app.request("GET", "/api/v1/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
}
