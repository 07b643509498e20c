use super::{RepositoryError, RepositoryResult};
use crate::models::comment::{Comment, LandmarkComment};
use async_trait::async_trait;
use sqlx::SqlitePool;

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait CommentRepository: Send + Sync {
    async fn create_comment(
        &self,
        user_id: i64,
        landmark_id: i64,
        body: &str,
        date: &str,
    ) -> RepositoryResult<Comment>;
    async fn delete_by_id(&self, id: i64) -> RepositoryResult<()>;
    /// Deletes every comment matching all three values; returns how many.
    async fn delete_matching(
        &self,
        user_id: i64,
        landmark_id: i64,
        body: &str,
    ) -> RepositoryResult<u64>;
    async fn list_for_landmark(&self, landmark_id: i64) -> RepositoryResult<Vec<LandmarkComment>>;
    async fn list_for_user(&self, user_id: i64) -> RepositoryResult<Vec<Comment>>;
}

pub struct SqliteCommentRepository {
    pool: SqlitePool,
}

impl SqliteCommentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for SqliteCommentRepository {
    async fn create_comment(
        &self,
        user_id: i64,
        landmark_id: i64,
        body: &str,
        date: &str,
    ) -> RepositoryResult<Comment> {
        let result = sqlx::query(
            "INSERT INTO comments (user_id, comment, landmark_id, date) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(body)
        .bind(landmark_id)
        .bind(date)
        .execute(&self.pool)
        .await?;

        Ok(Comment {
            id: result.last_insert_rowid(),
            user_id,
            landmark_id,
            comment: body.to_string(),
            date: date.to_string(),
        })
    }

    async fn delete_by_id(&self, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete_matching(
        &self,
        user_id: i64,
        landmark_id: i64,
        body: &str,
    ) -> RepositoryResult<u64> {
        let result = sqlx::query(
            "DELETE FROM comments WHERE user_id = ? AND landmark_id = ? AND comment = ?",
        )
        .bind(user_id)
        .bind(landmark_id)
        .bind(body)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(result.rows_affected())
    }

    async fn list_for_landmark(&self, landmark_id: i64) -> RepositoryResult<Vec<LandmarkComment>> {
        // Newest first. Dates are stored as dd.mm.YYYY text, which does not
        // sort chronologically, so the insertion id decides.
        let comments = sqlx::query_as::<_, LandmarkComment>(
            r#"
            SELECT
                c.id,
                c.user_id,
                c.comment,
                c.date,
                u.name AS user_name,
                COALESCE(u.avatar_uri, '@drawable/avatar2') AS avatar_uri
            FROM comments c
            JOIN users u ON c.user_id = u.id
            WHERE c.landmark_id = ?
            ORDER BY c.id DESC
            "#,
        )
        .bind(landmark_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    async fn list_for_user(&self, user_id: i64) -> RepositoryResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, user_id, landmark_id, comment, date
            FROM comments
            WHERE user_id = ?
            ORDER BY id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_pool, insert_test_user};

    #[tokio::test]
    async fn test_landmark_listing_joins_author_newest_first() {
        let pool = create_test_pool().await;
        let user_id = insert_test_user(&pool, "Anna", "anna@example.com", "pw")
            .await
            .expect("user to be inserted");
        let repo = SqliteCommentRepository::new(pool);

        repo.create_comment(user_id, 3, "first", "01.01.2025 10:00")
            .await
            .expect("comment to be created");
        repo.create_comment(user_id, 3, "second", "31.12.2024 09:00")
            .await
            .expect("comment to be created");

        let comments = repo.list_for_landmark(3).await.expect("listing to succeed");

        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].comment, "second");
        assert_eq!(comments[0].user_name, "Anna");
        assert_eq!(comments[0].avatar_uri, "@drawable/avatar2");
    }

    #[tokio::test]
    async fn test_delete_matching_removes_all_duplicates() {
        let pool = create_test_pool().await;
        let user_id = insert_test_user(&pool, "Anna", "anna@example.com", "pw")
            .await
            .expect("user to be inserted");
        let repo = SqliteCommentRepository::new(pool);

        for _ in 0..2 {
            repo.create_comment(user_id, 3, "same", "01.01.2025 10:00")
                .await
                .expect("comment to be created");
        }
        let kept = repo
            .create_comment(user_id, 3, "other", "01.01.2025 10:00")
            .await
            .expect("comment to be created");

        let deleted = repo
            .delete_matching(user_id, 3, "same")
            .await
            .expect("delete to succeed");

        assert_eq!(deleted, 2);
        let remaining = repo.list_for_user(user_id).await.expect("listing to succeed");
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, kept.id);
    }

    #[tokio::test]
    async fn test_delete_by_id_missing_is_not_found() {
        let pool = create_test_pool().await;
        let repo = SqliteCommentRepository::new(pool);

        let result = repo.delete_by_id(42).await;

        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }
}
