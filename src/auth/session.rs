//! Display-only session projection
//!
//! Decodes the payload segment of a token WITHOUT checking its signature and
//! turns it into an `IdentityView` for rendering "who am I" state. The result
//! is not a trust decision: anything privileged goes through
//! `TokenVerifier::verify` (see `auth::middleware`).

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{jwt::Claims, AuthFailure, DEFAULT_ROLE};

/// Read-only identity projection of a token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityView {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub display_name: String,
    pub role: String,
    pub rank: Option<String>,
    pub unit: Option<String>,
    pub last_activity: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Subject identifiers show up as strings or numbers depending on the issuer.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ClaimId {
    Text(String),
    Number(i64),
}

impl ClaimId {
    fn into_string(self) -> String {
        match self {
            ClaimId::Text(s) => s,
            ClaimId::Number(n) => n.to_string(),
        }
    }
}

/// Every claim the projection understands, all optional.
///
/// Fallback order:
/// - id: `sub`, then `user_id`, then `id`, then empty
/// - display name: `display_name`, then `username`
/// - role: `role`, then `DEFAULT_ROLE`
/// - last activity: `iat`, then the current time
#[derive(Debug, Default, Deserialize)]
struct DisplayClaims {
    sub: Option<ClaimId>,
    user_id: Option<ClaimId>,
    id: Option<ClaimId>,
    username: Option<String>,
    email: Option<String>,
    display_name: Option<String>,
    role: Option<String>,
    rank: Option<String>,
    unit: Option<String>,
    iat: Option<i64>,
    exp: Option<i64>,
}

impl From<Claims> for DisplayClaims {
    fn from(claims: Claims) -> Self {
        Self {
            sub: Some(ClaimId::Text(claims.sub)),
            username: Some(claims.username),
            email: Some(claims.email),
            display_name: claims.display_name,
            role: Some(claims.role),
            rank: claims.rank,
            unit: claims.unit,
            iat: Some(claims.iat),
            exp: Some(claims.exp),
            ..Default::default()
        }
    }
}

/// Project an unverified token for display. NOT an authorization check.
pub fn materialize_for_display(token: Option<&str>) -> Result<IdentityView, AuthFailure> {
    materialize_for_display_at(token, Utc::now())
}

/// `materialize_for_display` evaluated at `now`.
pub fn materialize_for_display_at(
    token: Option<&str>,
    now: DateTime<Utc>,
) -> Result<IdentityView, AuthFailure> {
    let token = token.ok_or(AuthFailure::Unauthenticated)?;
    let claims = decode_payload(token)?;
    project(claims, now)
}

impl IdentityView {
    /// Project claims that already passed `TokenVerifier::verify`.
    pub fn from_verified(claims: Claims, now: DateTime<Utc>) -> Result<Self, AuthFailure> {
        project(DisplayClaims::from(claims), now)
    }
}

fn decode_payload(token: &str) -> Result<DisplayClaims, AuthFailure> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_), None) if !payload.is_empty() => payload,
        _ => return Err(AuthFailure::Malformed),
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|_| AuthFailure::Malformed)?;

    let object: serde_json::Map<String, serde_json::Value> =
        serde_json::from_slice(&bytes).map_err(|_| AuthFailure::Malformed)?;

    serde_json::from_value(serde_json::Value::Object(object)).map_err(|_| AuthFailure::Malformed)
}

fn project(claims: DisplayClaims, now: DateTime<Utc>) -> Result<IdentityView, AuthFailure> {
    // A payload without an expiry has no defined session lifetime.
    let exp = claims.exp.ok_or(AuthFailure::Malformed)?;
    if exp < now.timestamp() {
        return Err(AuthFailure::Expired);
    }
    let expires_at = timestamp(exp).ok_or(AuthFailure::Malformed)?;

    let id = claims
        .sub
        .or(claims.user_id)
        .or(claims.id)
        .map(ClaimId::into_string)
        .unwrap_or_default();
    let username = claims.username.unwrap_or_default();
    let display_name = claims.display_name.unwrap_or_else(|| username.clone());
    let last_activity = claims.iat.and_then(timestamp).unwrap_or(now);

    Ok(IdentityView {
        id,
        username,
        email: claims.email,
        display_name,
        role: claims.role.unwrap_or_else(|| DEFAULT_ROLE.to_string()),
        rank: claims.rank,
        unit: claims.unit,
        last_activity,
        expires_at,
    })
}

fn timestamp(secs: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0).single()
}
