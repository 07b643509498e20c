use crate::models::user::{ProfileUpdate, User, UserProfile, DEFAULT_AVATAR_URI};
use crate::repositories::{user_repository::UserRepository, RepositoryError};
use crate::services::credentials;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Name must not be empty")]
    InvalidName,
    #[error("Password must not be empty")]
    EmptyPassword,
    #[error("No fields to update")]
    EmptyUpdate,
    #[error("Email already registered")]
    EmailTaken,
    #[error("User not found")]
    UserNotFound,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Invalid old password")]
    InvalidOldPassword,
    #[error("{0}")]
    HashingError(#[from] credentials::HashingError),
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub avatar_uri: Option<String>,
}

pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub struct ChangePasswordRequest {
    pub user_id: i64,
    pub old_password: String,
    pub new_password: String,
}

pub struct UserService {
    repository: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<User, UserServiceError> {
        if request.name.trim().is_empty() {
            return Err(UserServiceError::InvalidName);
        }
        self.validate_email(&request.email)?;
        if request.password.is_empty() {
            return Err(UserServiceError::EmptyPassword);
        }

        if self.repository.find_by_email(&request.email).await?.is_some() {
            return Err(UserServiceError::EmailTaken);
        }

        let password_hash = credentials::hash_password_blocking(&request.password).await?;
        let avatar_uri = request.avatar_uri.as_deref().unwrap_or(DEFAULT_AVATAR_URI);

        // A concurrent registration can still win the race to the unique index
        match self
            .repository
            .create_user(&request.name, &request.email, &password_hash, avatar_uri)
            .await
        {
            Ok(user) => Ok(user),
            Err(RepositoryError::AlreadyExists) => Err(UserServiceError::EmailTaken),
            Err(e) => Err(UserServiceError::RepositoryError(e)),
        }
    }

    pub async fn authenticate(&self, request: LoginRequest) -> Result<User, UserServiceError> {
        let user = self
            .repository
            .find_by_email(&request.email)
            .await?
            .ok_or(UserServiceError::InvalidCredentials)?;

        if !credentials::verify_password_blocking(&request.password, &user.password_hash).await {
            return Err(UserServiceError::InvalidCredentials);
        }

        if credentials::needs_rehash(&user.password_hash) {
            self.upgrade_digest(&user, &request.password).await;
        }

        Ok(user)
    }

    async fn upgrade_digest(&self, user: &User, password: &str) {
        let upgraded = match credentials::hash_password_blocking(password).await {
            Ok(hash) => hash,
            Err(e) => {
                tracing::warn!("Could not rehash legacy digest for user {}: {}", user.id, e);
                return;
            }
        };

        match self.repository.update_password(user.id, &upgraded).await {
            Ok(()) => tracing::info!("Upgraded legacy password digest for user {}", user.id),
            Err(e) => tracing::warn!("Failed to store upgraded digest for user {}: {}", user.id, e),
        }
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, UserServiceError> {
        Ok(self.repository.find_by_email(email).await?)
    }

    pub async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, UserServiceError> {
        Ok(self.repository.find_by_id(id).await?)
    }

    pub async fn get_profile(&self, email: &str) -> Result<UserProfile, UserServiceError> {
        self.repository
            .find_by_email(email)
            .await?
            .map(UserProfile::from)
            .ok_or(UserServiceError::UserNotFound)
    }

    pub async fn list_users(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<User>, UserServiceError> {
        Ok(self.repository.list_users(limit, offset).await?)
    }

    pub async fn update_profile(
        &self,
        user_id: i64,
        update: ProfileUpdate,
    ) -> Result<(), UserServiceError> {
        if update.is_empty() {
            return Err(UserServiceError::EmptyUpdate);
        }
        if matches!(&update.name, Some(name) if name.trim().is_empty()) {
            return Err(UserServiceError::InvalidName);
        }

        match self.repository.update_profile(user_id, &update).await {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => Err(UserServiceError::UserNotFound),
            Err(e) => Err(UserServiceError::RepositoryError(e)),
        }
    }

    /// Requires the current password. An unknown user is reported the same
    /// way as a wrong password.
    pub async fn change_password(
        &self,
        request: ChangePasswordRequest,
    ) -> Result<(), UserServiceError> {
        let user = self
            .repository
            .find_by_id(request.user_id)
            .await?
            .ok_or(UserServiceError::InvalidOldPassword)?;

        let verified =
            credentials::verify_password_blocking(&request.old_password, &user.password_hash).await;
        if !verified {
            return Err(UserServiceError::InvalidOldPassword);
        }

        self.set_password(user.id, &request.new_password).await
    }

    /// Replaces the stored digest without checking the old password.
    pub async fn set_password(&self, user_id: i64, new_password: &str) -> Result<(), UserServiceError> {
        if new_password.is_empty() {
            return Err(UserServiceError::EmptyPassword);
        }

        let password_hash = credentials::hash_password_blocking(new_password).await?;

        match self
            .repository
            .update_password(user_id, &password_hash)
            .await
        {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => Err(UserServiceError::UserNotFound),
            Err(e) => Err(UserServiceError::RepositoryError(e)),
        }
    }

    pub async fn delete_user(&self, id: i64) -> Result<(), UserServiceError> {
        match self.repository.delete_user(id).await {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => Err(UserServiceError::UserNotFound),
            Err(e) => Err(UserServiceError::RepositoryError(e)),
        }
    }

    fn validate_email(&self, email: &str) -> Result<(), UserServiceError> {
        if !email.contains('@') || email.len() > 255 || email.is_empty() {
            return Err(UserServiceError::InvalidEmail);
        }
        Ok(())
    }
}
