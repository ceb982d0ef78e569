use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo::{RepoError, UserRepository};
use crate::users::repo_types::{NewUser, User, UserPatch};

/// In-memory [`UserRepository`] with the same email constraint as the table.
#[derive(Default)]
pub struct InMemoryUserRepository {
    rows: Mutex<Vec<User>>,
    fail_writes: AtomicBool,
}

impl InMemoryUserRepository {
    /// Makes every subsequent write fail with a storage error.
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    /// Every stored row, soft-deleted ones included.
    pub fn raw_rows(&self) -> Vec<User> {
        self.rows.lock().map(|rows| rows.clone()).unwrap_or_default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<User>>, RepoError> {
        self.rows
            .lock()
            .map_err(|error| RepoError::Storage(format!("failed to lock repo state: {error}")))
    }

    fn check_writable(&self) -> Result<(), RepoError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepoError::Storage("store unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn exists_by_email(&self, email: &str) -> Result<bool, RepoError> {
        Ok(self.lock()?.iter().any(|u| u.email == email))
    }

    async fn insert(&self, user: &NewUser) -> Result<User, RepoError> {
        self.check_writable()?;
        let mut rows = self.lock()?;
        if rows.iter().any(|u| u.email == user.email) {
            return Err(RepoError::UniqueViolation("users_email_key".into()));
        }
        let now = OffsetDateTime::now_utc();
        let stored = User {
            id: Uuid::new_v4(),
            name: user.name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        rows.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self
            .lock()?
            .iter()
            .find(|u| u.id == id && u.deleted_at.is_none())
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .lock()?
            .iter()
            .find(|u| u.email == email && u.deleted_at.is_none())
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<User>, RepoError> {
        Ok(self
            .lock()?
            .iter()
            .filter(|u| u.deleted_at.is_none())
            .cloned()
            .collect())
    }

    async fn update(&self, id: Uuid, patch: &UserPatch) -> Result<bool, RepoError> {
        self.check_writable()?;
        let mut rows = self.lock()?;
        if let Some(email) = &patch.email {
            if rows.iter().any(|u| u.id != id && &u.email == email) {
                return Err(RepoError::UniqueViolation("users_email_key".into()));
            }
        }
        let Some(row) = rows
            .iter_mut()
            .find(|u| u.id == id && u.deleted_at.is_none())
        else {
            return Ok(false);
        };
        if let Some(name) = &patch.name {
            row.name = name.clone();
        }
        if let Some(email) = &patch.email {
            row.email = email.clone();
        }
        if let Some(hash) = &patch.password_hash {
            row.password_hash = hash.clone();
        }
        row.updated_at = OffsetDateTime::now_utc();
        Ok(true)
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, RepoError> {
        self.check_writable()?;
        let mut rows = self.lock()?;
        let Some(row) = rows
            .iter_mut()
            .find(|u| u.id == id && u.deleted_at.is_none())
        else {
            return Ok(false);
        };
        let now = OffsetDateTime::now_utc();
        row.deleted_at = Some(now);
        row.updated_at = now;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "n".into(),
            email: email.into(),
            password_hash: "hash".into(),
        }
    }

    #[tokio::test]
    async fn writes_report_whether_a_live_row_matched() {
        let repo = InMemoryUserRepository::default();
        let user = repo.insert(&new_user("a@x.io")).await.expect("insert");

        assert!(!repo.update(Uuid::new_v4(), &UserPatch::default()).await.expect("update"));
        assert!(repo.update(user.id, &UserPatch::default()).await.expect("update"));

        assert!(repo.soft_delete(user.id).await.expect("delete"));
        assert!(!repo.soft_delete(user.id).await.expect("second delete"));
        assert!(!repo.update(user.id, &UserPatch::default()).await.expect("update deleted"));
    }
}
