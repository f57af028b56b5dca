//! 认证服务：登录、注册、会话查询

use crate::{
    auth::{
        jwt::{TokenIssuer, TokenVerifier},
        materialize_for_display,
        password::PasswordHasher,
        token_fingerprint, AuthFailure, IdentityView, DEFAULT_ROLE,
    },
    config::{AppConfig, AuthMode, SecurityConfig},
    error::AppError,
    models::{
        auth::{LoginRequest, RegisterRequest},
        user::{User, UserResponse},
    },
    repository::UserRepository,
    services::BackendClient,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// 凭据由谁校验、令牌由谁签发
pub enum CredentialAuthority {
    /// 本地用户库，本地签发
    Local {
        users: UserRepository,
        issuer: Arc<TokenIssuer>,
    },
    /// 后端校验并签发
    Backend(BackendClient),
}

pub struct AuthService {
    authority: CredentialAuthority,
    hasher: Arc<PasswordHasher>,
    verifier: Arc<TokenVerifier>,
    security: SecurityConfig,
    verify_session_signature: bool,
}

impl AuthService {
    pub fn new(
        authority: CredentialAuthority,
        verifier: Arc<TokenVerifier>,
        config: &AppConfig,
    ) -> Self {
        Self {
            authority,
            hasher: Arc::new(PasswordHasher::new()),
            verifier,
            security: config.security.clone(),
            verify_session_signature: config.session.verify_signature,
        }
    }

    pub fn mode(&self) -> AuthMode {
        match self.authority {
            CredentialAuthority::Local { .. } => AuthMode::Local,
            CredentialAuthority::Backend(_) => AuthMode::Backend,
        }
    }

    /// 用户登录，返回签名令牌
    pub async fn login(&self, req: LoginRequest) -> Result<String, AppError> {
        match &self.authority {
            CredentialAuthority::Local { users, issuer } => {
                let Some(user) = users.find_by_login(&req.username).await else {
                    // 与密码错误耗时一致，不暴露账号是否存在
                    self.verify_unknown_account(req.password).await?;
                    tracing::info!(login = %req.username, "Login failed: unknown user");
                    return Err(AppError::InvalidCredentials);
                };

                if !self.verify_password(req.password, user.password_hash.clone()).await? {
                    tracing::info!(user_id = %user.id, "Login failed: wrong password");
                    return Err(AppError::InvalidCredentials);
                }

                let token = issuer.issue(&user.token_subject())?;

                tracing::info!(
                    user_id = %user.id,
                    fingerprint = %token_fingerprint(&token),
                    "Login succeeded"
                );

                Ok(token)
            }
            CredentialAuthority::Backend(client) => {
                let token = client.login(&req).await?;

                tracing::info!(
                    login = %req.username,
                    fingerprint = %token_fingerprint(&token),
                    "Backend login succeeded"
                );

                Ok(token)
            }
        }
    }

    /// 注册新用户
    pub async fn register(&self, req: RegisterRequest) -> Result<UserResponse, AppError> {
        match &self.authority {
            CredentialAuthority::Local { users, .. } => {
                PasswordHasher::validate_password_policy(&req.password, &self.security)?;

                let password_hash = self.hash_password(req.password).await?;

                let user = users
                    .create(User {
                        id: Uuid::new_v4(),
                        username: req.username.trim().to_string(),
                        email: req.email.trim().to_string(),
                        password_hash,
                        role: DEFAULT_ROLE.to_string(),
                        display_name: req.display_name,
                        rank: req.rank,
                        unit: req.unit,
                        created_at: Utc::now(),
                    })
                    .await?;

                tracing::info!(user_id = %user.id, username = %user.username, "User registered");

                Ok(UserResponse::from(user))
            }
            CredentialAuthority::Backend(client) => client.register(&req).await,
        }
    }

    /// 根据令牌生成会话视图
    ///
    /// 未开启 `session.verify_signature` 时只做本地解码，结果仅供界面展示，
    /// 不能作为鉴权依据。
    pub fn describe(&self, token: Option<&str>) -> Result<IdentityView, AuthFailure> {
        if self.verify_session_signature {
            let token = token.ok_or(AuthFailure::Unauthenticated)?;
            let claims = self.verifier.verify(token)?;
            IdentityView::from_verified(claims, Utc::now())
        } else {
            materialize_for_display(token)
        }
    }

    /// 凭据来源是否可用
    pub async fn check_ready(&self) -> Result<String, AppError> {
        match &self.authority {
            CredentialAuthority::Local { users, .. } => {
                Ok(format!("local user store, {} users", users.count().await))
            }
            CredentialAuthority::Backend(client) => {
                client.ping().await?;
                Ok(format!("backend {} reachable", client.base_url()))
            }
        }
    }

    /// 密码校验放到阻塞线程池，避免占用异步运行时
    async fn verify_password(&self, password: String, hash: String) -> Result<bool, AppError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))
    }

    async fn verify_unknown_account(&self, password: String) -> Result<bool, AppError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify_unknown_account(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))
    }

    async fn hash_password(&self, password: String) -> Result<String, AppError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
    }
}
