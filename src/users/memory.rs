use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use super::{StoreError, User, UserStore};

/// In-process store for tests. Email uniqueness covers soft-deleted rows too,
/// like the unique index on `users.email`.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    pub fn count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn soft_delete(&self, id: i64) {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.deleted_at = Some(OffsetDateTime::now_utc());
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| u.email == email && u.deleted_at.is_none())
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| u.id == id && u.deleted_at.is_none())
            .cloned())
    }

    async fn create(
        &self,
        full_name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == email) {
            return Err(StoreError::Duplicate);
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: users.len() as i64 + 1,
            full_name: full_name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        users.push(user.clone());
        Ok(user)
    }
}

/// Store whose database is unreachable. Lookups succeed with no match when
/// `lookups_work` is set so the insert path can fail on its own.
#[derive(Default)]
pub struct FailingUserStore {
    pub lookups_work: bool,
}

impl FailingUserStore {
    fn down() -> StoreError {
        StoreError::Database(sqlx::Error::PoolTimedOut)
    }
}

#[async_trait]
impl UserStore for FailingUserStore {
    async fn find_by_email(&self, _email: &str) -> Result<Option<User>, StoreError> {
        if self.lookups_work {
            Ok(None)
        } else {
            Err(Self::down())
        }
    }

    async fn find_by_id(&self, _id: i64) -> Result<Option<User>, StoreError> {
        if self.lookups_work {
            Ok(None)
        } else {
            Err(Self::down())
        }
    }

    async fn create(&self, _n: &str, _e: &str, _h: &str) -> Result<User, StoreError> {
        Err(Self::down())
    }
}
