//! User Entity
//!
//! Account identity owned by the user store and referenced read-only by the
//! access-control pipeline. The password hash is write-only from the API's
//! perspective: it is never serialized and never logged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Declared role of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Student,
    Instructor,
    Admin,
    SuperAdmin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "STUDENT",
            Self::Instructor => "INSTRUCTOR",
            Self::Admin => "ADMIN",
            Self::SuperAdmin => "SUPER_ADMIN",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "STUDENT" => Some(Self::Student),
            "INSTRUCTOR" => Some(Self::Instructor),
            "ADMIN" => Some(Self::Admin),
            "SUPER_ADMIN" => Some(Self::SuperAdmin),
            _ => None,
        }
    }
}

/// Account lifecycle state.
///
/// Transitions are one-directional in practice (`ACTIVE -> BLOCKED`,
/// `ACTIVE -> DELETED`); reactivation is an operator action through the
/// admin API, not an automatic reversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Active,
    Blocked,
    Deleted,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Blocked => "BLOCKED",
            Self::Deleted => "DELETED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ACTIVE" => Some(Self::Active),
            "BLOCKED" => Some(Self::Blocked),
            "DELETED" => Some(Self::Deleted),
            _ => None,
        }
    }
}

/// User account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Opaque stable identifier (UUID v4 string)
    pub id: String,

    /// Unique, lowercased email address
    pub email: String,

    /// Argon2 password hash; never serialized, never returned
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Display name
    pub name: String,

    pub role: UserRole,

    pub status: AccountStatus,

    /// Audit fields
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// New `ACTIVE` user with the default `STUDENT` role.
    ///
    /// The email is trimmed and lowercased here so that every store lookup
    /// operates on the normalized form.
    pub fn new(
        email: impl Into<String>,
        password_hash: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.into().trim().to_lowercase(),
            password_hash: password_hash.into(),
            name: name.into(),
            role: UserRole::Student,
            status: AccountStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_role(mut self, role: UserRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_status(mut self, status: AccountStatus) -> Self {
        self.status = status;
        self
    }

    pub fn set_status(&mut self, status: AccountStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    pub fn set_role(&mut self, role: UserRole) {
        self.role = role;
        self.updated_at = Utc::now();
    }

    pub fn set_password_hash(&mut self, hash: impl Into<String>) {
        self.password_hash = hash.into();
        self.updated_at = Utc::now();
    }

    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_defaults() {
        let user = User::new("Student@Example.COM", "hash", "Test Student");
        assert_eq!(user.email, "student@example.com");
        assert_eq!(user.role, UserRole::Student);
        assert_eq!(user.status, AccountStatus::Active);
        assert!(user.is_active());
    }

    #[test]
    fn test_status_change_stamps_updated_at() {
        let mut user = User::new("a@example.com", "hash", "A");
        let before = user.updated_at;
        std::thread::sleep(std::time::Duration::from_millis(2));
        user.set_status(AccountStatus::Blocked);
        assert_eq!(user.status, AccountStatus::Blocked);
        assert!(user.updated_at > before);
        assert!(!user.is_active());
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(
            serde_json::to_string(&UserRole::SuperAdmin).unwrap(),
            "\"SUPER_ADMIN\""
        );
        assert_eq!(
            serde_json::to_string(&AccountStatus::Blocked).unwrap(),
            "\"BLOCKED\""
        );
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!(UserRole::parse("super_admin"), Some(UserRole::SuperAdmin));
        assert_eq!(UserRole::parse("INSTRUCTOR"), Some(UserRole::Instructor));
        assert_eq!(UserRole::parse("nope"), None);
        assert_eq!(AccountStatus::parse("deleted"), Some(AccountStatus::Deleted));
        assert_eq!(AccountStatus::parse(""), None);
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User::new("a@example.com", "super-secret-hash", "A");
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("super-secret-hash"));
        assert!(!json.contains("passwordHash"));
    }
}
