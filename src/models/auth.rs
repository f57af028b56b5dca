//! Authentication-related models

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::IdentityView;

/// Login request
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct LoginRequest {
    /// Username or email
    #[validate(length(min = 1, max = 128, message = "请输入用户名"))]
    pub username: String,
    #[validate(length(min = 1, max = 1024, message = "请输入密码"))]
    pub password: String,
}

/// Registration request
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 64, message = "用户名长度需在 3 到 64 个字符之间"))]
    pub username: String,
    #[validate(email(message = "邮箱格式不正确"))]
    pub email: String,
    #[validate(length(max = 1024))]
    pub password: String,
    #[serde(default)]
    #[validate(length(max = 64))]
    pub display_name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 64))]
    pub rank: Option<String>,
    #[serde(default)]
    #[validate(length(max = 64))]
    pub unit: Option<String>,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: IdentityView,
}

/// Token returned by the backend's login endpoint
#[derive(Debug, Deserialize)]
pub struct BackendToken {
    #[serde(alias = "token")]
    pub access_token: String,
}
