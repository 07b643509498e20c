use crate::catalog::LandmarkCatalog;
use crate::models::comment::{Comment, LandmarkComment, Review, COMMENT_DATE_FORMAT};
use crate::repositories::{comment_repository::CommentRepository, RepositoryError};
use chrono::Local;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum CommentServiceError {
    #[error("Comment must not be empty")]
    EmptyComment,
    #[error("Comment not found")]
    NotFound,
    #[error("User not found")]
    UserNotFound,
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

pub struct CommentService {
    repository: Arc<dyn CommentRepository>,
    catalog: Arc<LandmarkCatalog>,
}

impl CommentService {
    pub fn new(repository: Arc<dyn CommentRepository>, catalog: Arc<LandmarkCatalog>) -> Self {
        Self {
            repository,
            catalog,
        }
    }

    /// Stamps the comment with the server's local time. The landmark id is
    /// not checked against the catalog.
    pub async fn add(
        &self,
        user_id: i64,
        landmark_id: i64,
        body: &str,
    ) -> Result<Comment, CommentServiceError> {
        if body.trim().is_empty() {
            return Err(CommentServiceError::EmptyComment);
        }

        let date = Local::now().format(COMMENT_DATE_FORMAT).to_string();

        match self
            .repository
            .create_comment(user_id, landmark_id, body, &date)
            .await
        {
            Ok(comment) => Ok(comment),
            Err(RepositoryError::MissingReference) => Err(CommentServiceError::UserNotFound),
            Err(e) => Err(CommentServiceError::RepositoryError(e)),
        }
    }

    pub async fn delete(&self, comment_id: i64) -> Result<(), CommentServiceError> {
        match self.repository.delete_by_id(comment_id).await {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => Err(CommentServiceError::NotFound),
            Err(e) => Err(CommentServiceError::RepositoryError(e)),
        }
    }

    /// Deletes by exact text. Identical duplicates are all removed together.
    pub async fn delete_matching(
        &self,
        user_id: i64,
        landmark_id: i64,
        body: &str,
    ) -> Result<u64, CommentServiceError> {
        match self
            .repository
            .delete_matching(user_id, landmark_id, body)
            .await
        {
            Ok(deleted) => Ok(deleted),
            Err(RepositoryError::NotFound) => Err(CommentServiceError::NotFound),
            Err(e) => Err(CommentServiceError::RepositoryError(e)),
        }
    }

    pub async fn for_landmark(
        &self,
        landmark_id: i64,
    ) -> Result<Vec<LandmarkComment>, CommentServiceError> {
        Ok(self.repository.list_for_landmark(landmark_id).await?)
    }

    pub async fn reviews_for_user(&self, user_id: i64) -> Result<Vec<Review>, CommentServiceError> {
        let comments = self.repository.list_for_user(user_id).await?;

        Ok(comments
            .into_iter()
            .map(|c| Review {
                id: c.id,
                landmark_id: c.landmark_id,
                landmark_name: self.catalog.name_of(c.landmark_id).to_string(),
                comment: c.comment,
                date: c.date,
            })
            .collect())
    }
}
