//! HTTP-level tests driving the full router with in-memory requests.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use palaver_server::{router, AppConfig, AppState};
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use tower::util::ServiceExt;

fn test_app() -> (Router, TempDir) {
    let dir = tempdir().unwrap();
    let config = AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        data_dir: dir.path().join("data"),
        uploads_dir: dir.path().join("uploads"),
        user_images_dir: dir.path().join("user_account_images"),
        public_dir: dir.path().join("public"),
    };
    let state = AppState::new(config).unwrap();
    (router(state), dir)
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn send_get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn signup(app: &Router, username: &str, password: &str) -> Value {
    let (status, body) = send_json(
        app,
        "POST",
        "/signup",
        json!({ "username": username, "password": password }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _dir) = test_app();
    let (status, body) = send_get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn duplicate_signup_is_a_conflict() {
    let (app, _dir) = test_app();
    signup(&app, "alice", "p1").await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/signup",
        json!({ "username": "alice", "password": "other" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("alice"));
}

#[tokio::test]
async fn login_checks_credentials_exactly() {
    let (app, _dir) = test_app();
    let created = signup(&app, "alice", "p1").await;

    let (status, _) = send_json(
        &app,
        "POST",
        "/login",
        json!({ "username": "alice", "password": "wrong" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send_json(
        &app,
        "POST",
        "/login",
        json!({ "username": "alice", "password": "p1" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], created["id"]);
    assert_eq!(body["username"], "alice");
}

#[tokio::test]
async fn friend_request_flow() {
    let (app, _dir) = test_app();
    signup(&app, "alice", "p1").await;
    signup(&app, "bob", "p2").await;

    let (status, _) = send_json(
        &app,
        "POST",
        "/friend-request",
        json!({ "fromUsername": "alice", "toUsername": "bob" }),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send_get(&app, "/friends?username=bob").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{
            "username": "alice",
            "profileImage": "/images/default.png",
            "status": "online",
        }])
    );

    let (status, _) = send_get(&app, "/friends?username=ghost").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn broadcast_chat_lifecycle() {
    let (app, _dir) = test_app();

    let (status, chat) = send_json(
        &app,
        "POST",
        "/new-chat",
        json!({ "conversationName": "lobby" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let conversation_id = chat["conversationId"].as_str().unwrap().to_string();

    let (status, message) = send_json(
        &app,
        "POST",
        "/message",
        json!({
            "fromUsername": "alice",
            "conversationId": conversation_id,
            "message": "hi",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(message["type"], "message");
    assert_eq!(message["message"], "hi");
    assert!(message["id"].as_str().is_some());
    assert!(message["timestamp"].as_str().is_some());

    let (status, records) =
        send_get(&app, &format!("/messages?conversationId={conversation_id}")).await;
    assert_eq!(status, StatusCode::OK);
    let records = records.as_array().unwrap().clone();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["type"], "chat");
    assert_eq!(records[1]["type"], "message");

    let (status, _) = send_json(
        &app,
        "DELETE",
        "/delete-chat",
        json!({ "conversationId": conversation_id }),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, records) =
        send_get(&app, &format!("/messages?conversationId={conversation_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(records, json!([]));
}

#[tokio::test]
async fn friend_chat_visibility_buckets() {
    let (app, _dir) = test_app();
    let alice = signup(&app, "alice", "p1").await;
    let bob = signup(&app, "bob", "p2").await;

    let (status, chat) = send_json(
        &app,
        "POST",
        "/create-friend-chat",
        json!({
            "fromUserId": alice["id"],
            "toUserId": bob["id"],
            "initialMessage": "hello there friend",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(chat["conversationName"], "hello there");
    assert_eq!(chat["type"], "friend-chat");

    send_json(&app, "POST", "/new-chat", json!({ "conversationName": "lobby" })).await;

    let alice_id = alice["id"].as_str().unwrap();
    let (status, chats) = send_get(&app, &format!("/user-chats?userId={alice_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(chats["created"].as_array().unwrap().len(), 1);
    assert_eq!(chats["joined"].as_array().unwrap().len(), 1);
    assert_eq!(chats["joined"][0]["type"], "chat");

    let bob_id = bob["id"].as_str().unwrap();
    let (_, chats) = send_get(&app, &format!("/user-chats?userId={bob_id}")).await;
    assert!(chats["created"].as_array().unwrap().is_empty());
    assert_eq!(chats["joined"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn empty_message_is_a_bad_request() {
    let (app, _dir) = test_app();
    let (status, chat) = send_json(
        &app,
        "POST",
        "/new-chat",
        json!({ "conversationName": "lobby" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(
        &app,
        "POST",
        "/message",
        json!({
            "fromUsername": "alice",
            "conversationId": chat["conversationId"],
            "message": "",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("message"));
}

#[tokio::test]
async fn file_upload_lands_in_the_conversation_tree() {
    let (app, dir) = test_app();
    signup(&app, "alice", "p1").await;
    signup(&app, "bob", "p2").await;

    let (_, chat) = send_json(
        &app,
        "POST",
        "/new-chat",
        json!({ "conversationName": "lobby" }),
    )
    .await;
    let conversation_id = chat["conversationId"].as_str().unwrap().to_string();

    let boundary = "test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"conversationId\"\r\n\r\n{conversation_id}\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"fromUsername\"\r\n\r\nalice\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"toUsername\"\r\n\r\nbob\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"pic.png\"\r\n\
         Content-Type: image/png\r\n\r\nfake image bytes\r\n\
         --{boundary}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let (status, message) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(message["type"], "file");
    let file_url = message["fileUrl"].as_str().unwrap();
    assert!(file_url.starts_with(&format!("{conversation_id}/")));
    assert!(file_url.ends_with(".png"));

    let stored = dir.path().join("uploads").join(file_url);
    assert_eq!(std::fs::read(stored).unwrap(), b"fake image bytes");
}

#[tokio::test]
async fn profile_image_upload_updates_the_account() {
    let (app, dir) = test_app();
    let alice = signup(&app, "alice", "p1").await;
    let alice_id = alice["id"].as_str().unwrap();

    let boundary = "test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"userId\"\r\n\r\n{alice_id}\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"profileImage\"; filename=\"me.jpg\"\r\n\
         Content-Type: image/jpeg\r\n\r\njpeg bytes\r\n\
         --{boundary}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/update-profile-image")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let (status, response) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        response["profileImage"],
        format!("{alice_id}/profile.jpg")
    );
    assert!(dir
        .path()
        .join("user_account_images")
        .join(alice_id)
        .join("profile.jpg")
        .exists());

    let (_, friends_of_bob) = {
        signup(&app, "bob", "p2").await;
        send_json(
            &app,
            "POST",
            "/friend-request",
            json!({ "fromUsername": "bob", "toUsername": "alice" }),
        )
        .await;
        send_get(&app, "/friends?username=bob").await
    };
    assert_eq!(
        friends_of_bob[0]["profileImage"],
        format!("{alice_id}/profile.jpg")
    );
}

#[tokio::test]
async fn change_password_round_trip() {
    let (app, _dir) = test_app();
    let alice = signup(&app, "alice", "p1").await;

    let (status, _) = send_json(
        &app,
        "POST",
        "/change-password",
        json!({ "userId": alice["id"], "oldPassword": "bad", "newPassword": "p2" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send_json(
        &app,
        "POST",
        "/change-password",
        json!({ "userId": alice["id"], "oldPassword": "p1", "newPassword": "p2" }),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send_json(
        &app,
        "POST",
        "/login",
        json!({ "username": "alice", "password": "p2" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
