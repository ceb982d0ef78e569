use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::users::repo_types::{NewUser, User, UserPatch};

const USER_COLUMNS: &str =
    "id, name, email, password_hash, is_active, created_at, updated_at, deleted_at";

#[derive(Debug, Error)]
pub enum RepoError {
    /// The store rejected a write on a unique constraint (`23505`).
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(error: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref database_error) = error {
            if database_error.code().as_deref() == Some("23505") {
                let constraint = database_error.constraint().unwrap_or("unknown").to_string();
                return RepoError::UniqueViolation(constraint);
            }
        }
        RepoError::Storage(error.to_string())
    }
}

/// Storage port for user rows.
///
/// Lookups only see live rows (`deleted_at IS NULL`); `exists_by_email` sees
/// every row so it agrees with the unique constraint on `email`.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn exists_by_email(&self, email: &str) -> Result<bool, RepoError>;
    async fn insert(&self, user: &NewUser) -> Result<User, RepoError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
    async fn find_all(&self) -> Result<Vec<User>, RepoError>;
    /// Overwrites the fields set in `patch` and refreshes `updated_at`.
    /// Returns `false` when no live row matched `id`.
    async fn update(&self, id: Uuid, patch: &UserPatch) -> Result<bool, RepoError>;
    /// Sets `deleted_at` and `updated_at` to now; the row stays.
    /// Returns `false` when no live row matched `id`.
    async fn soft_delete(&self, id: Uuid) -> Result<bool, RepoError>;
}

/// PostgreSQL implementation of [`UserRepository`].
#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn exists_by_email(&self, email: &str) -> Result<bool, RepoError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)"#,
        )
        .bind(email)
        .fetch_one(&self.db)
        .await?;
        Ok(exists)
    }

    async fn insert(&self, user: &NewUser) -> Result<User, RepoError> {
        let query = format!(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .fetch_one(&self.db)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let query = format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE id = $1 AND deleted_at IS NULL
            "#
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let query = format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE email = $1 AND deleted_at IS NULL
            "#
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn find_all(&self) -> Result<Vec<User>, RepoError> {
        let query = format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE deleted_at IS NULL
            ORDER BY created_at ASC
            "#
        );
        let users = sqlx::query_as::<_, User>(&query)
            .fetch_all(&self.db)
            .await?;
        Ok(users)
    }

    async fn update(&self, id: Uuid, patch: &UserPatch) -> Result<bool, RepoError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(patch.name.as_deref())
        .bind(patch.email.as_deref())
        .bind(patch.password_hash.as_deref())
        .execute(&self.db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET deleted_at = now(), updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.db)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
