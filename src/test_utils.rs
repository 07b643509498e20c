pub mod test_helpers {
    use crate::catalog::LandmarkCatalog;
    use crate::config::AppConfig;
    use crate::services::credentials;
    use crate::services::email_service::{EmailError, EmailService};
    use crate::services::password_reset_service::Clock;
    use crate::AppState;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, Utc};
    use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
    use std::sync::{Arc, RwLock};
    use tempfile::{NamedTempFile, TempDir};
    use tokio::sync::Mutex;

    /// Create a new in-memory SQLite database for testing
    pub async fn create_test_db() -> Result<SqlitePool, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(pool)
    }

    /// Create a temporary file-based SQLite database for testing
    /// Useful when a test needs more than one connection
    pub async fn create_test_db_file() -> Result<(SqlitePool, NamedTempFile), sqlx::Error> {
        let temp_file = NamedTempFile::new().map_err(sqlx::Error::Io)?;
        let db_path = temp_file
            .path()
            .to_str()
            .ok_or_else(|| sqlx::Error::Configuration("Invalid database path".into()))?;
        let database_url = format!("sqlite://{}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect(&database_url)
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok((pool, temp_file))
    }

    /// Insert a test user with an Argon2 password hash
    pub async fn insert_test_user(
        pool: &SqlitePool,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<i64, sqlx::Error> {
        let password_hash = credentials::hash_password(password).map_err(|e| {
            sqlx::Error::Configuration(format!("Password hashing failed: {}", e).into())
        })?;

        insert_user_with_digest(pool, name, email, &password_hash).await
    }

    /// Insert a user whose password is stored as a bare SHA-256 hex digest
    pub async fn insert_legacy_user(
        pool: &SqlitePool,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<i64, sqlx::Error> {
        insert_user_with_digest(pool, name, email, &credentials::legacy_digest(password)).await
    }

    async fn insert_user_with_digest(
        pool: &SqlitePool,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query("INSERT INTO users (name, email, password_hash) VALUES (?, ?, ?)")
            .bind(name)
            .bind(email)
            .bind(password_hash)
            .execute(pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    /// Clock that only moves when told to
    pub struct ManualClock {
        now: RwLock<DateTime<Utc>>,
    }

    impl ManualClock {
        pub fn new(start: DateTime<Utc>) -> Self {
            Self {
                now: RwLock::new(start),
            }
        }

        pub fn advance(&self, by: Duration) {
            let mut now = match self.now.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            match self.now.read() {
                Ok(guard) => *guard,
                Err(poisoned) => *poisoned.into_inner(),
            }
        }
    }

    /// Captures every code it is asked to send
    #[derive(Clone, Default)]
    pub struct RecordingEmailService {
        sent: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl RecordingEmailService {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn sent_count(&self) -> usize {
            self.sent.lock().await.len()
        }

        pub async fn last_code_for(&self, email: &str) -> Option<String> {
            self.sent
                .lock()
                .await
                .iter()
                .rev()
                .find(|(to, _)| to == email)
                .map(|(_, code)| code.clone())
        }
    }

    #[async_trait]
    impl EmailService for RecordingEmailService {
        async fn send_reset_code(
            &self,
            to_email: &str,
            code: &str,
            _valid_minutes: i64,
        ) -> Result<(), EmailError> {
            self.sent
                .lock()
                .await
                .push((to_email.to_string(), code.to_string()));
            Ok(())
        }
    }

    /// Mail relay that is always down
    pub struct FailingEmailService;

    #[async_trait]
    impl EmailService for FailingEmailService {
        async fn send_reset_code(
            &self,
            _to_email: &str,
            _code: &str,
            _valid_minutes: i64,
        ) -> Result<(), EmailError> {
            Err(EmailError::SendFailed("connection refused".to_string()))
        }
    }

    /// Defaults with avatars written under `avatar_dir`
    pub fn test_config(avatar_dir: &std::path::Path) -> AppConfig {
        AppConfig {
            database_url: "sqlite::memory:".to_string(),
            avatar_dir: avatar_dir.to_path_buf(),
            ..AppConfig::default()
        }
    }

    /// Full application state over `pool`, with a fresh avatar directory.
    /// Keep the returned `TempDir` alive for the duration of the test.
    pub async fn build_test_state(
        pool: SqlitePool,
        email_service: Box<dyn EmailService>,
        clock: Arc<dyn Clock>,
    ) -> Result<(AppState, TempDir), Box<dyn std::error::Error>> {
        let avatar_dir = TempDir::new()?;
        let config = test_config(avatar_dir.path());
        let catalog = Arc::new(LandmarkCatalog::builtin()?);

        let state = AppState::new(pool, &config, catalog, email_service, clock);
        state.avatar_service.ensure_directory().await?;

        Ok((state, avatar_dir))
    }
}

// Re-export commonly used test functions at module level for convenience
// Note: This is test-only code. Panic on error is acceptable in tests.
#[cfg(test)]
pub async fn create_test_pool() -> sqlx::SqlitePool {
    match test_helpers::create_test_db().await {
        Ok(pool) => pool,
        Err(e) => panic!("Failed to create test pool: {}", e),
    }
}

#[cfg(test)]
pub use test_helpers::insert_test_user;
