//! User model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity representing a registered user.
///
/// The password hash is never serialized into API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Display name
    pub username: String,
    /// Email address (unique)
    pub email: String,
    /// Password hash (argon2)
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with the given parameters.
    ///
    /// The password must already be hashed before calling this function;
    /// use `services::password::hash_password()`.
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by the database
            username,
            email,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_new() {
        let user = User::new(
            "momo".to_string(),
            "momo@example.com".to_string(),
            "hashed_password".to_string(),
        );

        assert_eq!(user.id, 0);
        assert_eq!(user.username, "momo");
        assert_eq!(user.email, "momo@example.com");
        assert_eq!(user.password_hash, "hashed_password");
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User::new(
            "momo".to_string(),
            "momo@example.com".to_string(),
            "$argon2id$secret".to_string(),
        );

        let json = serde_json::to_string(&user).expect("Failed to serialize user");
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("passwordHash"));
        assert!(json.contains("momo@example.com"));
    }

    #[test]
    fn test_wire_field_names_are_camel_case() {
        let user = User::new(
            "momo".to_string(),
            "momo@example.com".to_string(),
            "hash".to_string(),
        );

        let value = serde_json::to_value(&user).expect("Failed to serialize user");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("created_at").is_none());
    }
}
