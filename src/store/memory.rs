use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::{NewUser, Result, Role, StoreError, User, UserStore};

/// In-memory credential store (tests and local runs without Postgres).
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.lock().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.lock().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User> {
        let mut users = self.users.lock().await;
        if users.values().any(|u| u.email == new_user.email) {
            return Err(StoreError::Conflict);
        }
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            full_name: new_user.full_name,
            password_hash: new_user.password_hash,
            role: new_user.role,
            is_active: true,
            created_at: OffsetDateTime::now_utc(),
        };
        users.insert(user.id, user.clone());
        debug!(user_id = %user.id, "user stored in memory");
        Ok(user)
    }

    async fn save(&self, user: &User) -> Result<()> {
        let mut users = self.users.lock().await;
        if users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(StoreError::Conflict);
        }
        // Updating a missing id is a no-op, like an UPDATE matching no rows.
        if let Some(existing) = users.get_mut(&user.id) {
            existing.email = user.email.clone();
            existing.full_name = user.full_name.clone();
            existing.password_hash = user.password_hash.clone();
            existing.is_active = user.is_active;
        }
        Ok(())
    }

    async fn list_non_admins(&self, limit: i64, offset: i64) -> Result<Vec<User>> {
        let users = self.users.lock().await;
        let mut listed: Vec<User> = users
            .values()
            .filter(|u| u.role != Role::Admin)
            .cloned()
            .collect();
        // Newest first; id breaks ties so pages never overlap.
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(listed
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count_all(&self) -> Result<i64> {
        Ok(self.users.lock().await.len() as i64)
    }
}
