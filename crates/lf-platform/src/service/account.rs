//! Account Status Policy
//!
//! Pure decision table over the account lifecycle state, applied on login,
//! refresh, reset requests, and every authenticated request. A status change
//! therefore takes effect on the next request even while an already-issued
//! token remains cryptographically valid.

use crate::domain::{AccountStatus, User};
use crate::error::{PlatformError, Result};

/// Reject any user who is not `ACTIVE`. Role never factors in: a blocked
/// admin is blocked.
pub fn ensure_active(user: &User) -> Result<()> {
    match user.status {
        AccountStatus::Active => Ok(()),
        AccountStatus::Blocked => Err(PlatformError::AccountBlocked),
        AccountStatus::Deleted => Err(PlatformError::AccountDeleted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;

    fn user_with_status(status: AccountStatus) -> User {
        User::new("u@example.com", "hash", "U").with_status(status)
    }

    #[test]
    fn test_active_passes() {
        assert!(ensure_active(&user_with_status(AccountStatus::Active)).is_ok());
    }

    #[test]
    fn test_blocked_rejected() {
        assert!(matches!(
            ensure_active(&user_with_status(AccountStatus::Blocked)).unwrap_err(),
            PlatformError::AccountBlocked
        ));
    }

    #[test]
    fn test_deleted_rejected() {
        assert!(matches!(
            ensure_active(&user_with_status(AccountStatus::Deleted)).unwrap_err(),
            PlatformError::AccountDeleted
        ));
    }

    #[test]
    fn test_role_is_irrelevant() {
        let blocked_admin = User::new("admin@example.com", "hash", "Admin")
            .with_role(UserRole::SuperAdmin)
            .with_status(AccountStatus::Blocked);
        assert!(ensure_active(&blocked_admin).is_err());
    }
}
