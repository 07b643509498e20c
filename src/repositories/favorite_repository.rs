use super::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use sqlx::SqlitePool;

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait FavoriteRepository: Send + Sync {
    async fn add_favorite(&self, user_id: i64, landmark_id: i64) -> RepositoryResult<()>;
    async fn remove_favorite(&self, user_id: i64, landmark_id: i64) -> RepositoryResult<()>;
    async fn list_landmark_ids(&self, user_id: i64) -> RepositoryResult<Vec<i64>>;
}

pub struct SqliteFavoriteRepository {
    pool: SqlitePool,
}

impl SqliteFavoriteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FavoriteRepository for SqliteFavoriteRepository {
    /// Fails with `AlreadyExists` for a duplicate pair and `MissingReference`
    /// when the user does not exist.
    async fn add_favorite(&self, user_id: i64, landmark_id: i64) -> RepositoryResult<()> {
        sqlx::query("INSERT INTO favorites (user_id, landmark_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(landmark_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn remove_favorite(&self, user_id: i64, landmark_id: i64) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = ? AND landmark_id = ?")
            .bind(user_id)
            .bind(landmark_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn list_landmark_ids(&self, user_id: i64) -> RepositoryResult<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT landmark_id FROM favorites WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}
