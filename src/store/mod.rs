//! Credential store: the sole owner of user records.
//!
//! Handlers only ever hold request-scoped copies obtained through [`UserStore`].

use async_trait::async_trait;
use uuid::Uuid;

mod memory;
mod repo;
mod repo_types;

pub use memory::MemoryUserStore;
pub use repo::PgUserStore;
pub use repo_types::{NewUser, Role, User};
use repo_types::UserRow;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email already exists")]
    Conflict,

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// `email` must already be normalized.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Fails with [`StoreError::Conflict`] when the email is taken.
    async fn create(&self, new_user: NewUser) -> Result<User>;

    /// Overwrites the mutable fields (email, full name, password hash, activity flag).
    async fn save(&self, user: &User) -> Result<()>;

    /// Non-admin accounts, newest first.
    async fn list_non_admins(&self, limit: i64, offset: i64) -> Result<Vec<User>>;

    /// Every account, admins included.
    async fn count_all(&self) -> Result<i64>;
}
