use super::{RepositoryError, RepositoryResult};
use crate::models::user::{ProfileUpdate, User};
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const USER_COLUMNS: &str = r#"
    id,
    name,
    email,
    password_hash,
    COALESCE(avatar_uri, '@drawable/avatar2') AS avatar_uri
"#;

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait UserRepository: Send + Sync {
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        avatar_uri: &str,
    ) -> RepositoryResult<User>;
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>>;
    async fn update_profile(&self, id: i64, update: &ProfileUpdate) -> RepositoryResult<()>;
    async fn update_password(&self, id: i64, password_hash: &str) -> RepositoryResult<()>;
    async fn update_avatar(&self, id: i64, avatar_uri: &str) -> RepositoryResult<()>;
    async fn delete_user(&self, id: i64) -> RepositoryResult<()>;
    async fn list_users(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> RepositoryResult<Vec<User>>;
}

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        avatar_uri: &str,
    ) -> RepositoryResult<User> {
        let result = sqlx::query(
            "INSERT INTO users (name, email, password_hash, avatar_uri) VALUES (?, ?, ?, ?)",
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(avatar_uri)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_profile(&self, id: i64, update: &ProfileUpdate) -> RepositoryResult<()> {
        let changes = update.changes();
        if changes.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE users SET ");
        let mut assignments = builder.separated(", ");
        for (field, value) in changes {
            assignments.push(format!("{} = ", field.column()));
            assignments.push_bind_unseparated(value);
        }
        builder.push(" WHERE id = ");
        builder.push_bind(id);

        let result = builder.build().execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> RepositoryResult<()> {
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn update_avatar(&self, id: i64, avatar_uri: &str) -> RepositoryResult<()> {
        let result = sqlx::query("UPDATE users SET avatar_uri = ? WHERE id = ?")
            .bind(avatar_uri)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete_user(&self, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn list_users(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> RepositoryResult<Vec<User>> {
        let limit = limit.unwrap_or(100);
        let offset = offset.unwrap_or(0);

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id LIMIT ? OFFSET ?"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::DEFAULT_AVATAR_URI;
    use crate::test_utils::create_test_pool;

    #[tokio::test]
    async fn test_create_user_round_trips_profile() {
        let pool = create_test_pool().await;
        let repo = SqliteUserRepository::new(pool);

        let user = repo
            .create_user("Anna", "anna@example.com", "hash", DEFAULT_AVATAR_URI)
            .await
            .expect("user to be created");

        assert_eq!(user.name, "Anna");
        assert_eq!(user.avatar_uri, DEFAULT_AVATAR_URI);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_already_exists() {
        let pool = create_test_pool().await;
        let repo = SqliteUserRepository::new(pool);

        repo.create_user("Anna", "anna@example.com", "hash", DEFAULT_AVATAR_URI)
            .await
            .expect("first insert to succeed");
        let second = repo
            .create_user("Other", "anna@example.com", "hash", DEFAULT_AVATAR_URI)
            .await;

        assert!(matches!(second, Err(RepositoryError::AlreadyExists)));
    }

    #[tokio::test]
    async fn test_update_profile_only_touches_given_fields() {
        let pool = create_test_pool().await;
        let repo = SqliteUserRepository::new(pool);
        let user = repo
            .create_user("Anna", "anna@example.com", "hash", "/avatars/a.png")
            .await
            .expect("user to be created");

        let update = ProfileUpdate {
            name: Some("Anya".to_string()),
            avatar_uri: None,
        };
        repo.update_profile(user.id, &update)
            .await
            .expect("update to succeed");

        let updated = repo
            .find_by_id(user.id)
            .await
            .expect("lookup to succeed")
            .expect("user to exist");
        assert_eq!(updated.name, "Anya");
        assert_eq!(updated.avatar_uri, "/avatars/a.png");
    }

    #[tokio::test]
    async fn test_update_profile_missing_user() {
        let pool = create_test_pool().await;
        let repo = SqliteUserRepository::new(pool);

        let update = ProfileUpdate {
            name: Some("Ghost".to_string()),
            avatar_uri: None,
        };
        let result = repo.update_profile(404, &update).await;

        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }
}
