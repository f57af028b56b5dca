//! HTTP 中间件
//! 应用状态与请求追踪

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    auth::{SessionCookie, SigningSecret, TokenIssuer, TokenVerifier},
    config::{AppConfig, AuthMode},
    error::AppError,
    repository::UserRepository,
    services::{AuthService, BackendClient, CredentialAuthority},
};

/// 应用状态
///
/// 签名密钥在启动时构建一次，之后只读共享
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub auth_service: Arc<AuthService>,
    pub verifier: Arc<TokenVerifier>,
    pub cookie: SessionCookie,
}

impl AppState {
    /// 根据配置构建应用状态
    pub fn build(config: AppConfig) -> Result<Self, AppError> {
        let secret = SigningSecret::from_config(&config.security)?;
        let verifier = Arc::new(TokenVerifier::new(&secret));

        let authority = match config.auth.mode {
            AuthMode::Local => CredentialAuthority::Local {
                users: UserRepository::new(),
                issuer: Arc::new(TokenIssuer::new(&secret)),
            },
            AuthMode::Backend => {
                CredentialAuthority::Backend(BackendClient::from_config(&config.backend)?)
            }
        };

        let auth_service = Arc::new(AuthService::new(authority, verifier.clone(), &config));
        let cookie = SessionCookie::new(config.security.cookie_secure());

        tracing::info!(
            mode = ?config.auth.mode,
            profile = ?config.security.profile,
            secure_cookie = cookie.is_secure(),
            verify_session_signature = config.session.verify_signature,
            "Application state initialized"
        );

        Ok(Self {
            config,
            auth_service,
            verifier,
            cookie,
        })
    }
}

/// 请求追踪中间件
/// 为每个请求生成 trace_id 和 request_id，并记录指标
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    // 生成或提取 trace_id/request_id
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().to_string();
    // 只记录路径，查询参数可能包含敏感信息
    let path = req.uri().path().to_string();

    // 创建 span
    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        path = %path,
    );

    async move {
        let start = Instant::now();

        // 继续处理请求
        let mut response = next.run(req).await;

        let elapsed = start.elapsed();

        // 记录指标 - 使用静态字符串
        let status = response.status().as_u16();
        let method_name = match method.as_str() {
            "GET" => "GET",
            "POST" => "POST",
            "PUT" => "PUT",
            "DELETE" => "DELETE",
            "PATCH" => "PATCH",
            _ => "UNKNOWN",
        };
        let status_code = match status {
            200 => "200",
            201 => "201",
            204 => "204",
            400 => "400",
            401 => "401",
            403 => "403",
            404 => "404",
            409 => "409",
            500 => "500",
            502 => "502",
            _ => "other",
        };

        metrics::counter!("http_requests_total", "method" => method_name, "status" => status_code)
            .increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        // 记录日志
        tracing::info!(
            method = %method,
            path = %path,
            status = status,
            elapsed_ms = elapsed.as_millis() as u64,
            "Request completed"
        );

        // 在响应头中添加 trace_id
        if let Ok(value) = HeaderValue::from_str(&trace_id) {
            response.headers_mut().insert("x-trace-id", value);
        }
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert("x-request-id", value);
        }

        response
    }
    .instrument(span)
    .await
}

/// 从请求头中提取或生成 trace_id
fn extract_or_generate_trace_id(headers: &HeaderMap) -> String {
    headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty() && s.len() <= 128)
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
