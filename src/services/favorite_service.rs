use crate::repositories::{favorite_repository::FavoriteRepository, RepositoryError};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum FavoriteServiceError {
    #[error("Favorite already exists")]
    AlreadyExists,
    #[error("Favorite not found")]
    NotFound,
    #[error("User not found")]
    UserNotFound,
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

pub struct FavoriteService {
    repository: Arc<dyn FavoriteRepository>,
}

impl FavoriteService {
    pub fn new(repository: Arc<dyn FavoriteRepository>) -> Self {
        Self { repository }
    }

    pub async fn add(&self, user_id: i64, landmark_id: i64) -> Result<(), FavoriteServiceError> {
        match self.repository.add_favorite(user_id, landmark_id).await {
            Ok(()) => Ok(()),
            Err(RepositoryError::AlreadyExists) => Err(FavoriteServiceError::AlreadyExists),
            Err(RepositoryError::MissingReference) => Err(FavoriteServiceError::UserNotFound),
            Err(e) => Err(FavoriteServiceError::RepositoryError(e)),
        }
    }

    pub async fn remove(&self, user_id: i64, landmark_id: i64) -> Result<(), FavoriteServiceError> {
        match self.repository.remove_favorite(user_id, landmark_id).await {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => Err(FavoriteServiceError::NotFound),
            Err(e) => Err(FavoriteServiceError::RepositoryError(e)),
        }
    }

    /// Landmark ids in the order they were favorited.
    pub async fn list(&self, user_id: i64) -> Result<Vec<i64>, FavoriteServiceError> {
        Ok(self.repository.list_landmark_ids(user_id).await?)
    }
}
