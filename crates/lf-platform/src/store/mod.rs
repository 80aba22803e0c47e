//! User Store
//!
//! Persistence seam for user accounts. The access-control core only ever
//! calls these primitives; schema and transaction discipline belong to the
//! backing store.

use async_trait::async_trait;

use crate::domain::{AccountStatus, User, UserRole};
use crate::error::Result;

pub mod memory;

pub use memory::InMemoryUserStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Lookup by normalized (lowercased) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>>;

    /// Page of users ordered by creation time, plus the total count.
    async fn list(&self, offset: u32, limit: u32) -> Result<(Vec<User>, u64)>;

    /// Insert a new user; fails with `Duplicate` if the email is taken.
    async fn insert(&self, user: &User) -> Result<()>;

    async fn update_password(&self, id: &str, password_hash: &str) -> Result<()>;

    async fn update_status(&self, id: &str, status: AccountStatus) -> Result<()>;

    async fn update_role(&self, id: &str, role: UserRole) -> Result<()>;
}
