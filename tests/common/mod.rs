//! 测试公共模块
//! 提供测试辅助函数和测试工具

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use lab_console::{
    config::{
        AppConfig, AuthConfig, AuthMode, BackendConfig, LoggingConfig, Profile, SecurityConfig,
        ServerConfig, SessionConfig,
    },
    middleware::AppState,
    routes,
};
use secrecy::Secret;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-key-for-testing-only-min-32-chars";

/// 创建测试配置
pub fn create_test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            addr: "127.0.0.1:0".to_string(), // 使用随机端口
            graceful_shutdown_timeout_secs: 5,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            profile: Profile::Test,
            jwt_secret: Some(Secret::new(TEST_SECRET.to_string())),
            password_min_length: 6,
            password_require_uppercase: false,
            password_require_digit: false,
            password_require_special: false,
        },
        auth: AuthConfig {
            mode: AuthMode::Local,
        },
        backend: BackendConfig {
            base_url: None,
            timeout_secs: 5,
        },
        session: SessionConfig {
            verify_signature: false,
        },
    }
}

/// 使用指定配置创建路由
pub fn create_app_with(config: AppConfig) -> Router {
    let state = Arc::new(AppState::build(config).expect("Failed to build app state"));
    routes::create_router(state)
}

/// 使用默认测试配置创建路由
pub fn create_test_app() -> Router {
    create_app_with(create_test_config())
}

/// 读取 JSON 响应体
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// 发送 JSON POST 请求
pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

/// 发送带可选 Authorization / Cookie 的 GET 请求
pub async fn get_with(
    app: &Router,
    uri: &str,
    bearer: Option<&str>,
    cookie: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    if let Some(value) = cookie {
        builder = builder.header(header::COOKIE, value);
    }

    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// 注册测试用户
pub async fn register_user(app: &Router, username: &str, password: &str) {
    let response = post_json(
        app,
        "/api/auth/register",
        json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": password,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

/// 登录并返回访问令牌
pub async fn login(app: &Router, username: &str, password: &str) -> String {
    let response = post_json(
        app,
        "/api/auth/login",
        json!({"username": username, "password": password}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    json["access_token"].as_str().unwrap().to_string()
}
