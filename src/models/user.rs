//! User domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::TokenSubject;

/// Locally stored user account
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,

    // Profile
    pub display_name: Option<String>,
    pub rank: Option<String>,
    pub unit: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl User {
    /// Claims a session token for this user should carry
    pub fn token_subject(&self) -> TokenSubject {
        TokenSubject {
            id: self.id.to_string(),
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
            display_name: self.display_name.clone(),
            rank: self.rank.clone(),
            unit: self.unit.clone(),
        }
    }
}

/// User response (without sensitive data)
///
/// Also the shape expected back from the backend's register endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub rank: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_role() -> String {
    crate::auth::DEFAULT_ROLE.to_string()
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            email: Some(user.email),
            display_name: user.display_name,
            role: user.role,
            rank: user.rank,
            unit: user.unit,
            created_at: Some(user.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            role: "user".to_string(),
            display_name: None,
            rank: Some("sergeant".to_string()),
            unit: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_response_omits_password_hash() {
        let json = serde_json::to_value(UserResponse::from(user())).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "alice");
        assert_eq!(json["rank"], "sergeant");
    }

    #[test]
    fn test_token_subject_mirrors_user() {
        let user = user();
        let subject = user.token_subject();
        assert_eq!(subject.id, user.id.to_string());
        assert_eq!(subject.email, "alice@example.com");
        assert_eq!(subject.rank.as_deref(), Some("sergeant"));
    }

    #[test]
    fn test_backend_user_defaults() {
        let parsed: UserResponse =
            serde_json::from_str(r#"{"id": "b-1", "username": "dave"}"#).unwrap();
        assert_eq!(parsed.role, "user");
        assert_eq!(parsed.email, None);
    }
}
