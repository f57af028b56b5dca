//! Session token issuance and verification
//! HS256-signed compact tokens with a fixed seven-day lifetime

use crate::{
    auth::AuthFailure,
    config::{Profile, SecurityConfig},
    error::AppError,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

/// Lifetime of every issued token (7 days).
pub const TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Minimum accepted secret length for HS256.
pub const MIN_SECRET_LEN: usize = 32;

/// Only ever used outside production; `AppConfig::validate` and
/// `SigningSecret::from_config` both refuse it there.
const DEVELOPMENT_FALLBACK_SECRET: &str = "lab-console-development-only-secret-0000";

/// Shared HMAC secret for issuing and verifying tokens.
#[derive(Clone)]
pub struct SigningSecret(Secret<String>);

impl SigningSecret {
    pub fn new(secret: impl Into<String>) -> Result<Self, AppError> {
        let secret = secret.into();

        // Ensure secret is at least 32 bytes for HS256
        if secret.len() < MIN_SECRET_LEN {
            return Err(AppError::Config(format!(
                "JWT secret too short (min {} chars)",
                MIN_SECRET_LEN
            )));
        }

        Ok(Self(Secret::new(secret)))
    }

    /// Resolve the secret for the configured profile.
    pub fn from_config(security: &SecurityConfig) -> Result<Self, AppError> {
        match (&security.jwt_secret, security.profile) {
            (Some(secret), _) => Self::new(secret.expose_secret().clone()),
            (None, Profile::Production) => Err(AppError::Config(
                "JWT secret is not configured; refusing the development fallback in production"
                    .to_string(),
            )),
            (None, profile) => {
                tracing::warn!(
                    ?profile,
                    "LAB_SECURITY__JWT_SECRET not set, using the development fallback secret"
                );
                Ok(Self(Secret::new(DEVELOPMENT_FALLBACK_SECRET.to_string())))
            }
        }
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.expose_secret().as_bytes()
    }
}

impl std::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningSecret([REDACTED])")
    }
}

/// Identity claims carried by a session token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    pub username: String,

    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    pub role: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Issued at
    pub iat: i64,

    /// Expiration
    pub exp: i64,
}

/// Who a token is being issued for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub display_name: Option<String>,
    pub rank: Option<String>,
    pub unit: Option<String>,
}

/// Signs new session tokens
pub struct TokenIssuer {
    encoding_key: EncodingKey,
}

impl TokenIssuer {
    pub fn new(secret: &SigningSecret) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issue a token valid from now for `TOKEN_TTL_SECS`
    pub fn issue(&self, subject: &TokenSubject) -> Result<String, AppError> {
        self.issue_at(subject, Utc::now())
    }

    /// Issue a token as if the current time were `issued_at`
    pub fn issue_at(
        &self,
        subject: &TokenSubject,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let expiration = issued_at + Duration::seconds(TOKEN_TTL_SECS);

        let claims = Claims {
            sub: subject.id.clone(),
            username: subject.username.clone(),
            email: subject.email.clone(),
            display_name: subject.display_name.clone(),
            role: subject.role.clone(),
            rank: subject.rank.clone(),
            unit: subject.unit.clone(),
            iat: issued_at.timestamp(),
            exp: expiration.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode session token: {:?}", e);
            AppError::Internal(format!("Failed to encode session token: {}", e))
        })
    }
}

/// Checks signature and expiry of session tokens
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &SigningSecret) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Validate and decode token.
    ///
    /// The signature is checked before the claims are looked at, so a token
    /// that is both tampered and expired reports `InvalidSignature`.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthFailure> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let failure = classify(e.kind());
                tracing::debug!(
                    fingerprint = %crate::auth::token_fingerprint(token),
                    ?failure,
                    "Token verification failed: {:?}",
                    e
                );
                failure
            })
    }
}

fn classify(kind: &ErrorKind) -> AuthFailure {
    match kind {
        ErrorKind::InvalidSignature => AuthFailure::InvalidSignature,
        ErrorKind::ExpiredSignature => AuthFailure::Expired,
        _ => AuthFailure::Malformed,
    }
}
