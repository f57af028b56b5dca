//! 配置系统
//! 从环境变量加载所有配置，使用 Secret 包装敏感信息

use config::{Config, ConfigError, Environment};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址，例如 "0.0.0.0:3000"
    pub addr: String,
    /// 优雅关闭超时时间（秒）
    pub graceful_shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别: trace, debug, info, warn, error
    pub level: String,
    /// 日志格式: json, pretty, compact
    pub format: String,
}

/// 运行环境
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Development,
    Test,
    Production,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// 运行环境，决定 Cookie 的 Secure 属性以及是否允许开发用密钥
    pub profile: Profile,
    /// 令牌签名密钥（使用 Secret 包装，防止日志泄露）
    /// 生产环境必须设置
    pub jwt_secret: Option<Secret<String>>,
    /// 密码最小长度
    pub password_min_length: usize,
    /// 密码必须包含大写字母
    pub password_require_uppercase: bool,
    /// 密码必须包含数字
    pub password_require_digit: bool,
    /// 密码必须包含特殊字符
    pub password_require_special: bool,
}

impl SecurityConfig {
    /// 会话 Cookie 是否带 Secure 属性
    pub fn cookie_secure(&self) -> bool {
        self.profile == Profile::Production
    }
}

/// 凭据校验方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// 本地用户库 + 本地签发令牌
    Local,
    /// 转发到后端登录接口，由后端签发令牌
    Backend,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub mode: AuthMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// 后端服务地址，例如 "http://127.0.0.1:8000"
    pub base_url: Option<String>,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// 会话查询是否先校验签名
    /// 关闭时仅本地解码，结果只用于界面展示
    pub verify_signature: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub auth: AuthConfig,
    pub backend: BackendConfig,
    pub session: SessionConfig,
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut settings = Config::builder();

        // 添加默认配置
        settings = settings
            .set_default("server.addr", "0.0.0.0:3000")?
            .set_default("server.graceful_shutdown_timeout_secs", 30)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("security.profile", "development")?
            .set_default("security.password_min_length", 8)?
            .set_default("security.password_require_uppercase", false)?
            .set_default("security.password_require_digit", true)?
            .set_default("security.password_require_special", false)?
            .set_default("auth.mode", "local")?
            .set_default("backend.timeout_secs", 15)?
            .set_default("session.verify_signature", false)?;

        // 从环境变量加载配置（前缀为 LAB_）
        settings = settings.add_source(
            Environment::with_prefix("LAB")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = settings.build()?.try_deserialize()?;

        // 验证配置
        config.validate()?;

        Ok(config)
    }

    /// 验证配置合法性
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 验证端口范围
        if let Some(port_str) = self.server.addr.split(':').next_back() {
            if let Ok(port) = port_str.parse::<u16>() {
                if port != 0 && port < 1024 {
                    return Err(ConfigError::Message("Server port should be >= 1024".to_string()));
                }
            }
        }

        // 验证日志级别
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                )))
            }
        }

        // 验证日志格式
        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" | "compact" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log format: {}. Must be one of: json, pretty, compact",
                    self.logging.format
                )))
            }
        }

        // 生产环境禁止使用内置开发密钥
        match &self.security.jwt_secret {
            Some(secret) if secret.expose_secret().len() < 32 => {
                return Err(ConfigError::Message(
                    "JWT secret must be at least 32 characters long".to_string(),
                ));
            }
            None if self.security.profile == Profile::Production => {
                return Err(ConfigError::Message(
                    "LAB_SECURITY__JWT_SECRET must be set when profile is production".to_string(),
                ));
            }
            _ => {}
        }

        // 验证密码策略
        if self.security.password_min_length < 6 || self.security.password_min_length > 128 {
            return Err(ConfigError::Message(
                "password_min_length must be between 6 and 128".to_string(),
            ));
        }

        // 后端模式必须配置后端地址
        if self.auth.mode == AuthMode::Backend {
            match self.backend.base_url.as_deref() {
                Some(url) if url.starts_with("http://") || url.starts_with("https://") => {}
                Some(url) => {
                    return Err(ConfigError::Message(format!(
                        "backend.base_url must be an http(s) URL, got: {}",
                        url
                    )))
                }
                None => {
                    return Err(ConfigError::Message(
                        "backend.base_url is required when auth.mode is backend".to_string(),
                    ))
                }
            }
        }

        if self.backend.timeout_secs == 0 || self.backend.timeout_secs > 300 {
            return Err(ConfigError::Message(
                "backend.timeout_secs must be between 1 and 300".to_string(),
            ));
        }

        Ok(())
    }
}
