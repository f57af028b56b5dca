//! 认证相关的 HTTP 处理器

use crate::{
    auth::{locate, middleware::AuthContext, TOKEN_TTL_SECS},
    error::AppError,
    middleware::AppState,
    models::auth::*,
};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

/// 登录
/// 成功后令牌同时写入 Cookie 和响应体
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let token = state.auth_service.login(req).await?;

    // 后端签发的令牌若无法解析，视为后端异常
    let user = state.auth_service.describe(Some(&token)).map_err(|failure| {
        tracing::error!(?failure, "Freshly issued token cannot be described");
        AppError::Upstream(format!("issued token is unusable: {}", failure))
    })?;

    let cookie = state.cookie.issue(&token)?;

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            access_token: token,
            token_type: "Bearer",
            expires_in: TOKEN_TTL_SECS,
            user,
        }),
    ))
}

/// 注册
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let user = state.auth_service.register(req).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// 会话查询
/// 返回当前令牌对应的用户信息，未登录/令牌无效/已过期返回 401
pub async fn session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let token = locate(&headers);
    let view = state.auth_service.describe(token.as_deref())?;

    Ok(Json(view))
}

/// 登出
/// 无状态令牌没有服务端撤销，仅清除 Cookie
pub async fn logout(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::SET_COOKIE, state.cookie.clear())],
        Json(json!({"success": true, "message": "已成功登出"})),
    )
}

/// 获取当前用户信息（经过签名校验）
pub async fn get_current_user(auth_context: AuthContext) -> Json<AuthContext> {
    Json(auth_context)
}
