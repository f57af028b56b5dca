//! 后端认证接口客户端
//! 后端模式下登录与注册转发到后端，由后端签发令牌

use crate::{
    config::BackendConfig,
    error::AppError,
    models::{
        auth::{BackendToken, LoginRequest, RegisterRequest},
        user::UserResponse,
    },
};
use reqwest::StatusCode;
use std::time::Duration;

pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn from_config(config: &BackendConfig) -> Result<Self, AppError> {
        let base_url = config
            .base_url
            .as_deref()
            .ok_or_else(|| AppError::Config("backend.base_url is not configured".to_string()))?
            .trim_end_matches('/')
            .to_string();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 提交凭据，返回后端签发的访问令牌
    pub async fn login(&self, req: &LoginRequest) -> Result<String, AppError> {
        let url = format!("{}/auth/login", self.base_url);

        let response = self.http.post(&url).json(req).send().await.map_err(|e| {
            tracing::error!(url = %url, "Backend login request failed: {:?}", e);
            AppError::Upstream(format!("login request failed: {}", e))
        })?;

        let status = response.status();
        match status {
            s if s.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                return Err(AppError::InvalidCredentials)
            }
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                return Err(AppError::BadRequest("登录信息不完整".to_string()))
            }
            _ => {
                return Err(AppError::Upstream(format!("backend login returned {}", status)));
            }
        }

        let token: BackendToken = response.json().await.map_err(|e| {
            tracing::error!("Backend login response is not a token: {:?}", e);
            AppError::Upstream(format!("unexpected login response: {}", e))
        })?;

        Ok(token.access_token)
    }

    /// 转发注册请求
    pub async fn register(&self, req: &RegisterRequest) -> Result<UserResponse, AppError> {
        let url = format!("{}/auth/register", self.base_url);

        let response = self.http.post(&url).json(req).send().await.map_err(|e| {
            tracing::error!(url = %url, "Backend register request failed: {:?}", e);
            AppError::Upstream(format!("register request failed: {}", e))
        })?;

        let status = response.status();
        match status {
            s if s.is_success() => {}
            StatusCode::CONFLICT => {
                return Err(AppError::Conflict("用户名或邮箱已被注册".to_string()))
            }
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                return Err(AppError::BadRequest("注册信息不合法".to_string()))
            }
            _ => {
                return Err(AppError::Upstream(format!("backend register returned {}", status)));
            }
        }

        response.json::<UserResponse>().await.map_err(|e| {
            tracing::error!("Backend register response is not a user: {:?}", e);
            AppError::Upstream(format!("unexpected register response: {}", e))
        })
    }

    /// 探测后端是否可达（任何 HTTP 响应都视为可达）
    pub async fn ping(&self) -> Result<(), AppError> {
        self.http
            .get(&self.base_url)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| AppError::Upstream(format!("backend unreachable: {}", e)))
    }
}
