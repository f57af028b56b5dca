//! Session cookie construction

use axum::http::HeaderValue;

use crate::{
    auth::{jwt::TOKEN_TTL_SECS, locator::TOKEN_COOKIE},
    error::AppError,
};

const CLEAR_SECURE: &str =
    "token=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT";
const CLEAR_INSECURE: &str =
    "token=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT";

/// Builds `Set-Cookie` values for the `token` cookie
#[derive(Debug, Clone, Copy)]
pub struct SessionCookie {
    secure: bool,
}

impl SessionCookie {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Cookie carrying a freshly issued token, living as long as the token.
    pub fn issue(&self, token: &str) -> Result<HeaderValue, AppError> {
        let mut cookie = format!("{}={}; HttpOnly", TOKEN_COOKIE, token);
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str(&format!("; SameSite=Lax; Path=/; Max-Age={}", TOKEN_TTL_SECS));

        HeaderValue::from_str(&cookie).map_err(|e| {
            tracing::error!("Token is not a valid cookie value: {:?}", e);
            AppError::Internal("Token is not a valid cookie value".to_string())
        })
    }

    /// Cookie that overwrites the token with an empty, already-expired value.
    pub fn clear(&self) -> HeaderValue {
        if self.secure {
            HeaderValue::from_static(CLEAR_SECURE)
        } else {
            HeaderValue::from_static(CLEAR_INSECURE)
        }
    }
}
