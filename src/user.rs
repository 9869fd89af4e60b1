//! The user record model.
//!
//! Records are persisted as JSON with the exact field names used by the
//! existing data files (`createdAt`, lowercase roles), so any store written
//! by an earlier deployment keeps loading unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account role, controls which dashboard a login lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "user" => Some(Self::User),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored user account
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    // Stored and compared in plaintext. Known weak point, kept for
    // compatibility with existing data files.
    pub password: String,
    pub role: Role,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build a new record with a creation-instant id.
    ///
    /// Ids are Unix milliseconds at creation time. Two records created
    /// within the same millisecond would collide; that matches the
    /// original format and is not guarded against.
    pub fn new(username: &str, password: &str, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: now.timestamp_millis(),
            username: username.to_string(),
            password: password.to_string(),
            role,
            created_at: now,
        }
    }
}

/// The two accounts a fresh store is seeded with.
///
/// Fixed ids 1 and 2 so a re-created store matches the documented default
/// credentials exactly.
pub fn default_users() -> Vec<User> {
    let now = Utc::now();
    vec![
        User {
            id: 1,
            username: "admin".to_string(),
            password: "admin123".to_string(),
            role: Role::Admin,
            created_at: now,
        },
        User {
            id: 2,
            username: "user".to_string(),
            password: "user123".to_string(),
            role: Role::User,
            created_at: now,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_str() {
        assert_eq!(Role::from_str("admin"), Some(Role::Admin));
        assert_eq!(Role::from_str("Admin"), Some(Role::Admin));
        assert_eq!(Role::from_str("USER"), Some(Role::User));
        assert_eq!(Role::from_str("root"), None);
    }

    #[test]
    fn test_serialized_field_names() {
        let user = User::new("alice", "pw1", Role::User);
        let json = serde_json::to_value(&user).unwrap();
        // Persisted layout must keep the original camelCase key and
        // lowercase role strings.
        assert!(json.get("createdAt").is_some());
        assert_eq!(json.get("role").unwrap(), "user");
        assert_eq!(json.get("username").unwrap(), "alice");
    }

    #[test]
    fn test_deserialize_existing_format() {
        let raw = r#"{
            "id": 1700000000000,
            "username": "bob",
            "password": "pw3",
            "role": "admin",
            "createdAt": "2024-01-01T00:00:00Z"
        }"#;
        let user: User = serde_json::from_str(raw).unwrap();
        assert_eq!(user.id, 1700000000000);
        assert_eq!(user.role, Role::Admin);
    }

    #[test]
    fn test_new_user_id_from_creation_instant() {
        let before = Utc::now().timestamp_millis();
        let user = User::new("carol", "pw", Role::User);
        let after = Utc::now().timestamp_millis();
        assert!(user.id >= before && user.id <= after);
        assert_eq!(user.id, user.created_at.timestamp_millis());
    }

    #[test]
    fn test_default_users() {
        let users = default_users();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].username, "admin");
        assert_eq!(users[0].password, "admin123");
        assert_eq!(users[0].role, Role::Admin);
        assert_eq!(users[0].id, 1);
        assert_eq!(users[1].username, "user");
        assert_eq!(users[1].role, Role::User);
        assert_eq!(users[1].id, 2);
    }
}
