//! Password hashing and verification using Argon2id

use crate::{config::SecurityConfig, error::AppError};
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use once_cell::sync::OnceCell;

/// Memory cost in KiB (19 MiB).
pub const MEMORY_COST_KIB: u32 = 19 * 1024;

/// Number of passes over memory.
pub const ITERATIONS: u32 = 2;

/// Degree of parallelism.
pub const PARALLELISM: u32 = 1;

/// Input for the stand-in hash used when an account does not exist.
const UNKNOWN_ACCOUNT_PASSWORD: &str = "lab-console/unknown-account";

/// Password hasher with fixed cost parameters
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    unknown_account_hash: OnceCell<String>,
}

impl PasswordHasher {
    /// Create hasher with the crate-wide cost parameters
    pub fn new() -> Self {
        // OWASP minimum for Argon2id: m=19MiB, t=2, p=1
        let params = Params::new(MEMORY_COST_KIB, ITERATIONS, PARALLELISM, None)
            .unwrap_or_default();

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        Self {
            argon2,
            unknown_account_hash: OnceCell::new(),
        }
    }

    /// Hash a password into a PHC string carrying its own salt and parameters
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash password: {:?}", e);
                AppError::Internal(format!("Failed to hash password: {}", e))
            })?
            .to_string();

        Ok(password_hash)
    }

    /// Verify a password against a stored hash.
    ///
    /// Parameters are read from the hash itself, so hashes produced under
    /// older cost settings still verify. A hash that cannot be parsed yields
    /// `false`.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!("Failed to parse password hash: {:?}", e);
                return false;
            }
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Spend one verification on a login whose account does not exist.
    ///
    /// Runs the same Argon2 work as [`verify`](Self::verify) against a
    /// stand-in hash so the response time matches a wrong password. Always
    /// returns `false`.
    pub fn verify_unknown_account(&self, password: &str) -> bool {
        if let Ok(hash) = self
            .unknown_account_hash
            .get_or_try_init(|| self.hash(UNKNOWN_ACCOUNT_PASSWORD))
        {
            let _ = self.verify(password, hash);
        }
        false
    }

    /// Validate password against policy
    pub fn validate_password_policy(password: &str, policy: &SecurityConfig) -> Result<(), AppError> {
        // Check length
        if password.chars().count() < policy.password_min_length {
            return Err(AppError::Validation(format!(
                "密码长度至少为 {} 个字符",
                policy.password_min_length
            )));
        }

        // Check uppercase
        if policy.password_require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
            return Err(AppError::Validation("密码必须包含至少一个大写字母".to_string()));
        }

        // Check digit
        if policy.password_require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AppError::Validation("密码必须包含至少一个数字".to_string()));
        }

        // Check special character
        if policy.password_require_special && password.chars().all(|c| c.is_alphanumeric()) {
            return Err(AppError::Validation("密码必须包含至少一个特殊字符".to_string()));
        }

        Ok(())
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
