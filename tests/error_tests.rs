//! 错误处理单元测试
//!
//! 测试应用错误类型的状态码、用户消息与响应格式

use axum::{http::StatusCode, response::IntoResponse};
use http_body_util::BodyExt;
use lab_console::{auth::AuthFailure, error::AppError};

// ==================== 错误状态码测试 ====================

#[test]
fn test_auth_failures_are_401() {
    for failure in [
        AuthFailure::Unauthenticated,
        AuthFailure::Malformed,
        AuthFailure::InvalidSignature,
        AuthFailure::Expired,
    ] {
        assert_eq!(AppError::from(failure).status_code(), StatusCode::UNAUTHORIZED);
    }
}

#[test]
fn test_unexpected_faults_are_500() {
    assert_eq!(
        AppError::Internal("task panicked".to_string()).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        AppError::Config("missing secret".to_string()).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[test]
fn test_client_error_status_codes() {
    assert_eq!(AppError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(AppError::BadRequest("x".to_string()).status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(AppError::Validation("x".to_string()).status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(AppError::Conflict("x".to_string()).status_code(), StatusCode::CONFLICT);
    assert_eq!(AppError::Upstream("x".to_string()).status_code(), StatusCode::BAD_GATEWAY);
}

// ==================== 用户消息测试 ====================

#[test]
fn test_localized_auth_messages() {
    assert_eq!(AppError::from(AuthFailure::Unauthenticated).user_message(), "未登录");
    assert_eq!(AppError::from(AuthFailure::Malformed).user_message(), "登录凭证无效");
    assert_eq!(AppError::from(AuthFailure::InvalidSignature).user_message(), "登录凭证无效");
    assert_eq!(AppError::from(AuthFailure::Expired).user_message(), "登录已过期，请重新登录");
}

#[test]
fn test_user_messages_no_sensitive_info() {
    let config_error = AppError::Config("JWT secret too short (min 32 chars)".to_string());
    let message = config_error.user_message();
    assert_eq!(message, "服务配置错误");
    assert!(!message.contains("JWT"));

    let upstream = AppError::Upstream("error sending request for url (http://10.0.0.5/auth/login)".to_string());
    assert!(!upstream.user_message().contains("10.0.0.5"));
}

// ==================== 响应格式测试 ====================

#[tokio::test]
async fn test_error_response_shape() {
    let response = AppError::Internal("secret detail".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(json["error"]["code"], 500);
    assert_eq!(json["error"]["message"], "服务器内部错误");
    assert!(json["error"]["request_id"].is_string());
    assert!(!String::from_utf8_lossy(&bytes).contains("secret detail"));
}
