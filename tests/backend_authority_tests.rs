//! 后端认证模式集成测试
//!
//! 启动一个本地假后端，验证登录/注册转发与错误映射

use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use lab_console::{
    auth::{SigningSecret, TokenIssuer, TokenSubject},
    config::AuthMode,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

mod common;
use common::{body_json, create_app_with, get_with, post_json};

fn backend_token() -> String {
    TokenIssuer::new(&SigningSecret::new(common::TEST_SECRET).unwrap())
        .issue(&TokenSubject {
            id: "1001".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            role: "analyst".to_string(),
            display_name: Some("Alice".to_string()),
            rank: None,
            unit: Some("eval".to_string()),
        })
        .unwrap()
}

async fn fake_login(Json(body): Json<Value>) -> impl IntoResponse {
    match (body["username"].as_str(), body["password"].as_str()) {
        (Some("alice"), Some("correct")) => {
            (StatusCode::OK, Json(json!({"access_token": backend_token()})))
        }
        (Some("broken"), _) => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({}))),
        (Some("garbled"), _) => (StatusCode::OK, Json(json!({"access_token": "garbled"}))),
        _ => (StatusCode::UNAUTHORIZED, Json(json!({"detail": "bad credentials"}))),
    }
}

async fn fake_register(Json(body): Json<Value>) -> impl IntoResponse {
    if body["username"] == "taken" {
        return (StatusCode::CONFLICT, Json(json!({"detail": "exists"})));
    }
    (
        StatusCode::CREATED,
        Json(json!({
            "id": "2002",
            "username": body["username"],
            "email": body["email"],
        })),
    )
}

/// 启动假后端，返回其地址
async fn spawn_backend() -> String {
    let app = Router::new()
        .route("/", get(|| async { "ok" }))
        .route("/auth/login", post(fake_login))
        .route("/auth/register", post(fake_register));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn backend_config(base_url: String) -> lab_console::config::AppConfig {
    let mut config = common::create_test_config();
    config.auth.mode = AuthMode::Backend;
    config.backend.base_url = Some(base_url);
    config
}

#[tokio::test]
async fn test_backend_login_sets_backend_token() {
    let app = create_app_with(backend_config(spawn_backend().await));

    let response = post_json(
        &app,
        "/api/auth/login",
        json!({"username": "alice", "password": "correct"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let token = json["access_token"].as_str().unwrap().to_string();
    assert_eq!(json["user"]["id"], "1001");
    assert_eq!(json["user"]["role"], "analyst");
    assert_eq!(json["user"]["display_name"], "Alice");

    // 后端令牌与本地校验器兼容
    let response = get_with(&app, "/api/auth/me", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_backend_login_rejected() {
    let app = create_app_with(backend_config(spawn_backend().await));

    let response = post_json(
        &app,
        "/api/auth/login",
        json!({"username": "alice", "password": "wrong"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_backend_failure_maps_to_bad_gateway() {
    let app = create_app_with(backend_config(spawn_backend().await));

    let response = post_json(
        &app,
        "/api/auth/login",
        json!({"username": "broken", "password": "x"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let json = body_json(response).await;
    assert_eq!(json["error"]["message"], "后端服务暂不可用");
}

#[tokio::test]
async fn test_backend_unusable_token_is_bad_gateway() {
    let app = create_app_with(backend_config(spawn_backend().await));

    let response = post_json(
        &app,
        "/api/auth/login",
        json!({"username": "garbled", "password": "x"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_backend_register_forwarded() {
    let app = create_app_with(backend_config(spawn_backend().await));

    let response = post_json(
        &app,
        "/api/auth/register",
        json!({"username": "carol", "email": "carol@example.com", "password": "secret1"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["id"], "2002");
    assert_eq!(json["username"], "carol");
    assert_eq!(json["role"], "user");

    let response = post_json(
        &app,
        "/api/auth/register",
        json!({"username": "taken", "email": "taken@example.com", "password": "secret1"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_backend_unreachable() {
    // 绑定后立即释放端口，保证连接被拒绝
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let app = create_app_with(backend_config(format!("http://{}", addr)));

    let response = post_json(
        &app,
        "/api/auth/login",
        json!({"username": "alice", "password": "correct"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let response = get_with(&app, "/ready", None, None).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_backend_ready() {
    let app = create_app_with(backend_config(spawn_backend().await));

    let response = get_with(&app, "/ready", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["ready"], true);
}
