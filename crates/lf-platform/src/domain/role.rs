//! Principal and Role Requirements
//!
//! Authorization model for role-based access control.

use serde::{Deserialize, Serialize};

use crate::domain::user::{User, UserRole};

/// The authenticated identity attached to a request after the access-control
/// pipeline succeeds.
///
/// Ephemeral: derived from verified token claims, alive for one request,
/// never persisted. The role is the one embedded in the token, not a fresh
/// store read (see DESIGN.md).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: String,
    pub email: String,
    pub role: UserRole,
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// The set of roles permitted to invoke a route.
///
/// Assembled once at route registration and immutable afterwards. An empty
/// requirement admits any authenticated principal.
#[derive(Debug, Clone, Default)]
pub struct RoleRequirement {
    roles: Vec<UserRole>,
}

impl RoleRequirement {
    /// Requirement that admits any authenticated principal.
    pub fn any_authenticated() -> Self {
        Self::default()
    }

    /// Requirement admitting exactly the given roles (duplicates dropped,
    /// declaration order preserved).
    pub fn of(roles: impl IntoIterator<Item = UserRole>) -> Self {
        let mut deduped: Vec<UserRole> = Vec::new();
        for role in roles {
            if !deduped.contains(&role) {
                deduped.push(role);
            }
        }
        Self { roles: deduped }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.roles.is_empty()
    }

    /// Single authorization decision: an empty requirement passes
    /// unconditionally, otherwise the role must be a member.
    pub fn allows(&self, role: UserRole) -> bool {
        self.roles.is_empty() || self.roles.contains(&role)
    }

    pub fn roles(&self) -> &[UserRole] {
        &self.roles
    }
}
