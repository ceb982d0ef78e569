use std::sync::Arc;

use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult, EMAIL_IN_USE, SAVE_FAILED};
use crate::users::dto::{CreateUserInput, Envelope, UpdateUserInput};
use crate::users::password::hash_password_off_runtime;
use crate::users::repo::{RepoError, UserRepository};
use crate::users::repo_types::{NewUser, User, UserPatch};

pub const USER_SAVED: &str = "Usuario guardado exitosamente";
pub const USERS_LISTED: &str = "Usuarios obtenidos exitosamente";
pub const USER_UPDATED: &str = "Usuario actualizado exitosamente";
pub const USER_DELETED: &str = "Usuario eliminado exitosamente";

/// Owns the user record lifecycle on top of a [`UserRepository`].
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create(&self, input: CreateUserInput) -> ServiceResult<Envelope<User>> {
        let taken = self.repo.exists_by_email(&input.email).await.map_err(|e| {
            error!(error = %e, "email pre-check failed");
            ServiceError::Persistence(SAVE_FAILED.into())
        })?;
        if taken {
            warn!("email already in use");
            return Err(ServiceError::Conflict(EMAIL_IN_USE.into()));
        }

        let password_hash = hash_password_off_runtime(input.password)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let new_user = NewUser {
            name: input.name,
            email: input.email,
            password_hash,
        };
        let user = match self.repo.insert(&new_user).await {
            Ok(u) => u,
            Err(RepoError::UniqueViolation(constraint)) => {
                warn!(%constraint, "email taken by a concurrent insert");
                return Err(ServiceError::Conflict(EMAIL_IN_USE.into()));
            }
            Err(e) => {
                error!(error = %e, "insert user failed");
                return Err(ServiceError::Persistence(SAVE_FAILED.into()));
            }
        };

        info!(user_id = %user.id, "user created");
        Ok(Envelope::with_data(USER_SAVED, user))
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: Uuid) -> ServiceResult<User> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(storage)?
            .ok_or(ServiceError::NotFound)
    }

    #[instrument(skip(self, email))]
    pub async fn find_by_email(&self, email: &str) -> ServiceResult<User> {
        self.repo
            .find_by_email(email)
            .await
            .map_err(storage)?
            .ok_or(ServiceError::NotFound)
    }

    #[instrument(skip(self))]
    pub async fn get_all(&self) -> ServiceResult<Envelope<Vec<User>>> {
        let users = self.repo.find_all().await.map_err(storage)?;
        info!(count = users.len(), "users listed");
        Ok(Envelope::with_data(USERS_LISTED, users))
    }

    #[instrument(skip(self, patch))]
    pub async fn update_user(&self, id: Uuid, patch: UpdateUserInput) -> ServiceResult<Envelope<()>> {
        self.find_by_id(id).await?;

        if patch.is_empty() {
            info!(user_id = %id, "empty patch; touching updated_at only");
        }
        let password_hash = match patch.password {
            Some(plain) => Some(
                hash_password_off_runtime(plain)
                    .await
                    .map_err(|e| ServiceError::Internal(e.to_string()))?,
            ),
            None => None,
        };
        let patch = UserPatch {
            name: patch.name,
            email: patch.email,
            password_hash,
        };

        match self.repo.update(id, &patch).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(user_id = %id, "user vanished before update");
                return Err(ServiceError::NotFound);
            }
            Err(RepoError::UniqueViolation(_)) => {
                warn!(user_id = %id, "email already in use");
                return Err(ServiceError::Conflict(EMAIL_IN_USE.into()));
            }
            Err(e) => return Err(storage(e)),
        }

        info!(user_id = %id, "user updated");
        Ok(Envelope::ok(USER_UPDATED))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> ServiceResult<Envelope<()>> {
        self.find_by_id(id).await?;
        if !self.repo.soft_delete(id).await.map_err(storage)? {
            warn!(user_id = %id, "user vanished before soft-delete");
            return Err(ServiceError::NotFound);
        }
        info!(user_id = %id, "user soft-deleted");
        Ok(Envelope::ok(USER_DELETED))
    }
}

fn storage(e: RepoError) -> ServiceError {
    error!(error = %e, "storage operation failed");
    ServiceError::Internal(e.to_string())
}
