//! JWT 认证中间件
//! 需要鉴权的路由必须经过签名校验，不使用仅供展示的本地解码

use crate::{
    auth::{jwt::TokenVerifier, locator::locate, token_fingerprint, AuthFailure},
    error::AppError,
};
use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use std::sync::Arc;

/// 认证上下文（附加到请求扩展）
#[derive(Debug, Clone, Serialize)]
pub struct AuthContext {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    pub role: String,
    pub rank: Option<String>,
    pub unit: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

// 实现 FromRequestParts 以便在 handler 中直接提取 AuthContext
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AppError::Auth(AuthFailure::Unauthenticated))
    }
}

/// JWT 认证中间件 - 必须认证
pub async fn jwt_auth_middleware(
    State(verifier): State<Arc<TokenVerifier>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // 按 Authorization 头 → Cookie 的顺序查找令牌
    let token = locate(req.headers()).ok_or(AuthFailure::Unauthenticated)?;

    // 验证签名与有效期
    let claims = verifier.verify(&token)?;

    tracing::debug!(
        fingerprint = %token_fingerprint(&token),
        user_id = %claims.sub,
        "Token verified"
    );

    // 创建认证上下文
    let auth_context = AuthContext {
        user_id: claims.sub,
        username: claims.username,
        email: claims.email,
        display_name: claims.display_name,
        role: claims.role,
        rank: claims.rank,
        unit: claims.unit,
        expires_at: Utc.timestamp_opt(claims.exp, 0).single(),
    };

    // 附加到请求扩展
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
