//! Stateless session authentication
//!
//! Tokens are located on the request (header first, cookie second), then
//! either verified against the signing secret (`jwt::TokenVerifier`) or,
//! for the "who am I" display path only, decoded locally (`session`).

pub mod cookie;
pub mod jwt;
pub mod locator;
pub mod middleware;
pub mod password;
pub mod session;

use sha2::{Digest, Sha256};
use thiserror::Error;

pub use cookie::SessionCookie;
pub use jwt::{Claims, SigningSecret, TokenIssuer, TokenSubject, TokenVerifier, TOKEN_TTL_SECS};
pub use locator::{locate, TOKEN_COOKIE};
pub use middleware::{jwt_auth_middleware, AuthContext};
pub use password::PasswordHasher;
pub use session::{materialize_for_display, IdentityView};

/// Role assigned to new accounts and assumed when a token carries none.
pub const DEFAULT_ROLE: &str = "user";

/// Why a request could not be associated with a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthFailure {
    /// No token on the request.
    #[error("no token presented")]
    Unauthenticated,

    /// Token present but not decodable as a signed token.
    #[error("token is malformed")]
    Malformed,

    /// Token decodes but the signature does not match.
    #[error("token signature is invalid")]
    InvalidSignature,

    /// Token is well formed but past its expiry.
    #[error("token has expired")]
    Expired,
}

/// Short, non-reversible tag for a token, safe to put in logs.
pub fn token_fingerprint(token: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(token.as_bytes()));
    digest[..12].to_string()
}
