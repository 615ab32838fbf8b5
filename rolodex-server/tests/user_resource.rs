use axum::http::StatusCode;
use rolodex_core::codec::BackendKind;
use rolodex_model::Role;
use serde_json::{Value, json};

#[path = "support/mod.rs"]
mod support;
use support::{bearer, build_test_app};

#[tokio::test]
async fn admin_creates_and_lists_users() {
    for backend in BackendKind::all() {
        let app = build_test_app(*backend);
        let admin = app.seed("admin@example.com", Role::Admin).await;
        let token = app.token_for(&admin).await;

        let response = app
            .server
            .post("/v1/user/")
            .add_header("Authorization", bearer(&token))
            .json(&json!({
                "email": "ada@example.com",
                "password": "s3cret",
                "name": "Ada",
                "born": "1815-12-10",
                "gender": "female",
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let created: Value = response.json();
        let data = &created["data"];
        assert_eq!(data["email"], "ada@example.com");
        assert_eq!(data["name"], "Ada");
        assert_eq!(data["born"], "1815-12-10");
        assert_eq!(data["gender"], "female");
        assert_eq!(data["url"], Value::Null);
        assert_eq!(data["roles"], json!(["user"]));
        assert!(data.get("password").is_none());
        assert_eq!(data["id"].as_str().unwrap().len(), 32);

        let response = app
            .server
            .get("/v1/user/")
            .add_header("Authorization", bearer(&token))
            .await;
        response.assert_status_ok();
        let listed: Value = response.json();
        assert_eq!(listed["data"].as_array().unwrap().len(), 2);
    }
}

#[tokio::test]
async fn non_admin_cannot_list_or_create() {
    let app = build_test_app(BackendKind::Sqlite);
    let user = app.seed("user@example.com", Role::User).await;
    let token = app.token_for(&user).await;

    let response = app
        .server
        .get("/v1/user/")
        .add_header("Authorization", bearer(&token))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(
        body["error"]["message"],
        "only admins and data owners may perform this action"
    );

    app.server
        .post("/v1/user/")
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "email": "x@example.com", "password": "x" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn create_reports_the_missing_field() {
    let app = build_test_app(BackendKind::Sqlite);
    let admin = app.seed("admin@example.com", Role::Admin).await;
    let token = app.token_for(&admin).await;

    let response = app
        .server
        .post("/v1/user/")
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "email": "a@b.com" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["message"], "Missing required parameter password");
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = build_test_app(BackendKind::Sqlite);
    let admin = app.seed("admin@example.com", Role::Admin).await;
    let token = app.token_for(&admin).await;

    app.server
        .post("/v1/user/")
        .add_header("Authorization", bearer(&token))
        .add_header("Content-Type", "application/json")
        .bytes("{not json".into())
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn owner_reads_self_but_not_others() {
    let app = build_test_app(BackendKind::MySql);
    let user = app.seed("user@example.com", Role::User).await;
    let other = app.seed("other@example.com", Role::User).await;
    let token = app.token_for(&user).await;

    let response = app
        .server
        .get(&format!("/v1/user/{}/", user.username))
        .add_header("Authorization", bearer(&token))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["email"], "user@example.com");

    app.server
        .get(&format!("/v1/user/{}/", other.username))
        .add_header("Authorization", bearer(&token))
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_detail_without_match_is_null() {
    let app = build_test_app(BackendKind::Postgres);
    let admin = app.seed("admin@example.com", Role::Admin).await;
    let token = app.token_for(&admin).await;

    let response = app
        .server
        .get("/v1/user/0123456789abcdef0123456789abcdef/")
        .add_header("Authorization", bearer(&token))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"], Value::Null);
}

#[tokio::test]
async fn update_patches_only_supplied_fields() {
    let app = build_test_app(BackendKind::Sqlite);
    let admin = app.seed("admin@example.com", Role::Admin).await;
    let user = app.seed("user@example.com", Role::User).await;
    let admin_token = app.token_for(&admin).await;
    let user_token = app.token_for(&user).await;
    let path = format!("/v1/user/{}/", user.username);

    app.server
        .patch(&path)
        .add_header("Authorization", bearer(&user_token))
        .json(&json!({ "name": "Grace", "url": "https://example.com" }))
        .await
        .assert_status_ok();

    let response = app
        .server
        .put(&path)
        .add_header("Authorization", bearer(&admin_token))
        .json(&json!({ "bio": "Admiral" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["name"], "Grace");
    assert_eq!(body["data"]["url"], "https://example.com");
    assert_eq!(body["data"]["bio"], "Admiral");
}

#[tokio::test]
async fn user_cannot_update_someone_else() {
    let app = build_test_app(BackendKind::Sqlite);
    let user = app.seed("user@example.com", Role::User).await;
    let other = app.seed("other@example.com", Role::User).await;
    let token = app.token_for(&user).await;

    app.server
        .put(&format!("/v1/user/{}/", other.username))
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "name": "Mallory" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn invalid_gender_leaves_the_stored_value() {
    let app = build_test_app(BackendKind::Sqlite);
    let admin = app.seed("admin@example.com", Role::Admin).await;
    let token = app.token_for(&admin).await;
    let path = format!("/v1/user/{}/", admin.username);

    app.server
        .put(&path)
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "gender": "other" }))
        .await
        .assert_status_ok();

    let response = app
        .server
        .put(&path)
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "gender": "unknown", "name": "Changed" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(
        body["error"]["message"],
        "Gender must be one of ('male','female','other')"
    );

    let response = app
        .server
        .get(&path)
        .add_header("Authorization", bearer(&token))
        .await;
    let body: Value = response.json();
    assert_eq!(body["data"]["gender"], "other");
    assert_eq!(body["data"]["name"], Value::Null);
}

#[tokio::test]
async fn update_of_unknown_handle_is_not_found() {
    let app = build_test_app(BackendKind::Sqlite);
    let admin = app.seed("admin@example.com", Role::Admin).await;
    let token = app.token_for(&admin).await;

    let response = app
        .server
        .put("/v1/user/0123456789abcdef0123456789abcdef/")
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "name": "Nobody" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"]["message"], "Cannot update non existing object");
}

#[tokio::test]
async fn password_change_takes_effect() {
    let app = build_test_app(BackendKind::Sqlite);
    let user = app.seed("user@example.com", Role::User).await;
    let token = app.token_for(&user).await;

    app.server
        .put(&format!("/v1/user/{}/", user.username))
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "password": "n3w" }))
        .await
        .assert_status_ok();

    app.server
        .post("/v1/auth/token")
        .json(&json!({ "id": user.username, "password": "n3w" }))
        .await
        .assert_status_ok();
}
