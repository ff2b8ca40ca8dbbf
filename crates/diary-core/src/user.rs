//! User domain model

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::id::UserId;
use crate::{CoreError, Result};

pub const USERNAME_MIN_CHARS: usize = 3;
pub const USERNAME_MAX_CHARS: usize = 30;
pub const PASSWORD_MIN_CHARS: usize = 6;

/// Full user record as stored
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

impl User {
    /// Build a new user from already validated input and a password hash
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        Self {
            id: UserId::generate(),
            username,
            email,
            password_hash,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
        }
    }
}

/// Client-safe projection of a user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Trim and check a username
pub fn validate_username(raw: &str) -> Result<String> {
    let username = raw.trim();
    let len = username.chars().count();
    if !(USERNAME_MIN_CHARS..=USERNAME_MAX_CHARS).contains(&len) {
        return Err(CoreError::validation(
            "username",
            format!(
                "must be between {} and {} characters",
                USERNAME_MIN_CHARS, USERNAME_MAX_CHARS
            ),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
    {
        return Err(CoreError::validation(
            "username",
            "may only contain letters, digits, '_' and '-'",
        ));
    }
    Ok(username.to_string())
}

/// Trim, lower-case and sanity check an email address
pub fn validate_email(raw: &str) -> Result<String> {
    let email = raw.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    };
    if !valid || email.chars().any(char::is_whitespace) {
        return Err(CoreError::validation("email", "must be a valid email address"));
    }
    Ok(email)
}

pub fn validate_password(raw: &str) -> Result<()> {
    if raw.chars().count() < PASSWORD_MIN_CHARS {
        return Err(CoreError::validation(
            "password",
            format!("must be at least {} characters", PASSWORD_MIN_CHARS),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_validation() {
        assert_eq!(validate_username("  alice ").unwrap(), "alice");
        assert!(validate_username("al").is_err());
        assert!(validate_username("alice smith").is_err());
        assert!(validate_username(&"a".repeat(31)).is_err());
        assert!(validate_username("はなこさん").is_ok());
    }

    #[test]
    fn test_email_validation() {
        assert_eq!(
            validate_email(" Alice@Example.COM ").unwrap(),
            "alice@example.com"
        );
        assert!(validate_email("alice").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("alice@localhost").is_err());
        assert!(validate_email("a b@example.com").is_err());
    }

    #[test]
    fn test_password_validation() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_profile_omits_password_hash() {
        let user = User::new(
            "alice".to_string(),
            "alice@example.com".to_string(),
            "$argon2id$...".to_string(),
        );
        let json = serde_json::to_value(user.profile()).unwrap();
        assert_eq!(json["username"], "alice");
        assert!(json.get("passwordHash").is_none());
        assert!(json["createdAt"].is_string());
    }
}
