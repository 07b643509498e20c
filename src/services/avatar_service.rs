use crate::repositories::{user_repository::UserRepository, RepositoryError};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

/// URL prefix under which the avatar directory is served.
pub const AVATAR_URL_PREFIX: &str = "/avatars";

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "heic"];

#[derive(Debug, thiserror::Error)]
pub enum AvatarError {
    #[error("User not found")]
    UserNotFound,
    #[error("File is empty")]
    EmptyFile,
    #[error("File exceeds the {0} byte limit")]
    TooLarge(usize),
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("Failed to store avatar: {0}")]
    Io(#[from] std::io::Error),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

pub struct AvatarService {
    directory: PathBuf,
    max_bytes: usize,
    user_repository: Arc<dyn UserRepository>,
}

impl AvatarService {
    pub fn new(
        directory: impl Into<PathBuf>,
        max_bytes: usize,
        user_repository: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            directory: directory.into(),
            max_bytes,
            user_repository,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub async fn ensure_directory(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.directory).await
    }

    /// Writes the upload as `<email><ext>`, replacing any earlier upload with
    /// the same extension, and points the user's avatar at it.
    pub async fn store(
        &self,
        user_id: i64,
        original_filename: &str,
        contents: &[u8],
    ) -> Result<String, AvatarError> {
        let user = self
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or(AvatarError::UserNotFound)?;

        if contents.is_empty() {
            return Err(AvatarError::EmptyFile);
        }
        if contents.len() > self.max_bytes {
            return Err(AvatarError::TooLarge(self.max_bytes));
        }

        let extension = file_extension(original_filename)?;
        let filename = format!("{}{}", sanitize_file_stem(&user.email), extension);

        let path = self.directory.join(&filename);
        tokio::fs::write(&path, contents).await?;

        let avatar_uri = format!("{}/{}", AVATAR_URL_PREFIX, filename);
        if let Err(e) = self.user_repository.update_avatar(user_id, &avatar_uri).await {
            // Nothing points at the file now
            if let Err(io_err) = tokio::fs::remove_file(&path).await {
                tracing::warn!("Failed to remove orphaned avatar {:?}: {}", path, io_err);
            }
            return Err(match e {
                RepositoryError::NotFound => AvatarError::UserNotFound,
                e => e.into(),
            });
        }

        tracing::info!("Stored avatar for user {} at {}", user_id, avatar_uri);
        Ok(avatar_uri)
    }
}

/// Lower-cased extension including the dot, e.g. `.png`.
fn file_extension(filename: &str) -> Result<String, AvatarError> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .ok_or_else(|| AvatarError::UnsupportedType(filename.to_string()))?;

    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(AvatarError::UnsupportedType(extension));
    }

    Ok(format!(".{}", extension))
}

/// Emails may contain characters that are unsafe in paths or URLs.
fn sanitize_file_stem(email: &str) -> String {
    email
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '@' | '.' | '_' | '-' | '+' => c,
            _ => '_',
        })
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::repositories::user_repository::MockUserRepository;
    use mockall::predicate::*;

    fn user(id: i64, email: &str) -> User {
        User {
            id,
            name: "A".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            avatar_uri: "@drawable/avatar2".to_string(),
        }
    }

    #[tokio::test]
    async fn test_store_points_user_at_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_find_by_id()
            .with(eq(1))
            .returning(|id| Box::pin(async move { Ok(Some(user(id, "a@x.com"))) }));
        mock_repo
            .expect_update_avatar()
            .with(eq(1), eq("/avatars/a@x.com.png"))
            .times(1)
            .returning(|_, _| Box::pin(async move { Ok(()) }));

        let service = AvatarService::new(dir.path(), 1024, Arc::new(mock_repo));
        let uri = service.store(1, "me.png", b"png-bytes").await.unwrap();

        assert_eq!(uri, "/avatars/a@x.com.png");
        assert_eq!(
            std::fs::read(dir.path().join("a@x.com.png")).unwrap(),
            b"png-bytes"
        );
    }

    #[tokio::test]
    async fn test_store_removes_file_when_update_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_find_by_id()
            .returning(|id| Box::pin(async move { Ok(Some(user(id, "a@x.com"))) }));
        mock_repo
            .expect_update_avatar()
            .times(1)
            .returning(|_, _| Box::pin(async move { Err(RepositoryError::NotFound) }));

        let service = AvatarService::new(dir.path(), 1024, Arc::new(mock_repo));
        let result = service.store(1, "me.png", b"png-bytes").await;

        assert!(matches!(result, Err(AvatarError::UserNotFound)));
        assert!(!dir.path().join("a@x.com.png").exists());
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("me.PNG").unwrap(), ".png");
        assert_eq!(file_extension("photo.final.jpeg").unwrap(), ".jpeg");
        assert!(matches!(
            file_extension("script.sh"),
            Err(AvatarError::UnsupportedType(_))
        ));
        assert!(matches!(
            file_extension("no_extension"),
            Err(AvatarError::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_sanitize_file_stem() {
        assert_eq!(sanitize_file_stem("a@x.com"), "a@x.com");
        assert_eq!(sanitize_file_stem("../evil/@x.com"), "_evil_@x.com");
        assert_eq!(sanitize_file_stem("we ird@x.com"), "we_ird@x.com");
    }
}
