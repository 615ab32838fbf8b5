use axum::http::StatusCode;
use chrono::{Duration, Utc};
use rolodex_core::codec::BackendKind;
use rolodex_model::{AccessToken, Role};
use serde_json::{Value, json};

#[path = "support/mod.rs"]
mod support;
use support::{PASSWORD, bearer, build_test_app};

#[tokio::test]
async fn valid_credentials_issue_a_working_token() {
    let app = build_test_app(BackendKind::Sqlite);
    let admin = app.seed("admin@example.com", Role::Admin).await;

    let response = app
        .server
        .post("/v1/auth/token")
        .json(&json!({ "id": admin.username, "password": PASSWORD }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["id"], json!(admin.username));
    let token = body["data"]["token"].as_str().unwrap();
    assert_eq!(token.len(), 64);

    app.server
        .get("/v1/user/")
        .add_header("Authorization", bearer(token))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn wrong_password_or_handle_is_unauthorized() {
    let app = build_test_app(BackendKind::Sqlite);
    let user = app.seed("user@example.com", Role::User).await;

    for (id, password) in [
        (user.username.as_str(), "wrong"),
        ("00000000000000000000000000000000", PASSWORD),
        ("not-a-handle", PASSWORD),
    ] {
        let response = app
            .server
            .post("/v1/auth/token")
            .json(&json!({ "id": id, "password": password }))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["error"]["status"], 401);
    }
}

#[tokio::test]
async fn missing_and_bogus_tokens_are_unauthorized() {
    let app = build_test_app(BackendKind::Postgres);

    app.server
        .get("/v1/user/")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    app.server
        .get("/v1/user/")
        .add_header("Authorization", bearer("deadbeef"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    app.server
        .get("/v1/user/")
        .add_header("Authorization", "Token deadbeef")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_tokens_are_unauthorized() {
    let app = build_test_app(BackendKind::Sqlite);
    let admin = app.seed("admin@example.com", Role::Admin).await;

    let sealer = app.state.sealer();
    let token = sealer.issue_token().unwrap();
    app.state
        .unit_of_work()
        .tokens
        .issue(&AccessToken {
            digest: sealer.digest_token(&token).unwrap(),
            identity_id: admin.id,
            expires_at: Utc::now() - Duration::seconds(1),
        })
        .await
        .unwrap();

    app.server
        .get("/v1/user/")
        .add_header("Authorization", bearer(&token))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_needs_no_token() {
    let app = build_test_app(BackendKind::Sqlite);
    let response = app.server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "ok");
}
