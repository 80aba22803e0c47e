//! In-Memory User Store
//!
//! Reference `UserStore` backend used by the server binary in dev mode and
//! by the test suite. Single-row updates are atomic under the write lock.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::domain::{AccountStatus, User, UserRole};
use crate::error::{PlatformError, Result};
use crate::store::UserStore;

#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_user<T>(&self, id: &str, f: impl FnOnce(&mut User) -> T) -> Result<T> {
        let mut users = self.users.write();
        let user = users
            .get_mut(id)
            .ok_or_else(|| PlatformError::not_found("User", id))?;
        Ok(f(user))
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let needle = email.trim().to_lowercase();
        let users = self.users.read();
        Ok(users.values().find(|u| u.email == needle).cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.users.read().get(id).cloned())
    }

    async fn list(&self, offset: u32, limit: u32) -> Result<(Vec<User>, u64)> {
        let users = self.users.read();
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        let total = all.len() as u64;
        let page = all
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn insert(&self, user: &User) -> Result<()> {
        let mut users = self.users.write();
        if users.values().any(|u| u.email == user.email) {
            return Err(PlatformError::duplicate("User", "email", &user.email));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn update_password(&self, id: &str, password_hash: &str) -> Result<()> {
        self.with_user(id, |user| {
            user.password_hash = password_hash.to_string();
            user.updated_at = Utc::now();
        })
    }

    async fn update_status(&self, id: &str, status: AccountStatus) -> Result<()> {
        self.with_user(id, |user| user.set_status(status))
    }

    async fn update_role(&self, id: &str, role: UserRole) -> Result<()> {
        self.with_user(id, |user| user.set_role(role))
    }
}
