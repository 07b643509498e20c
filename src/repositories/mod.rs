pub mod comment_repository;
pub mod favorite_repository;
pub mod user_repository;

pub use comment_repository::{CommentRepository, SqliteCommentRepository};
pub use favorite_repository::{FavoriteRepository, SqliteFavoriteRepository};
pub use user_repository::{SqliteUserRepository, UserRepository};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),
    #[error("Database unavailable: {0}")]
    Unavailable(sqlx::Error),
    #[error("Record not found")]
    NotFound,
    #[error("Record already exists")]
    AlreadyExists,
    #[error("Referenced record does not exist")]
    MissingReference,
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        let (unique, foreign_key, busy) = match &err {
            sqlx::Error::Database(db_err) => (
                db_err.is_unique_violation(),
                db_err.is_foreign_key_violation(),
                // SQLITE_BUSY / SQLITE_LOCKED once the busy timeout elapsed
                matches!(db_err.code().as_deref(), Some("5") | Some("6")),
            ),
            _ => (false, false, false),
        };

        if unique {
            RepositoryError::AlreadyExists
        } else if foreign_key {
            RepositoryError::MissingReference
        } else if busy
            || matches!(
                err,
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
            )
        {
            RepositoryError::Unavailable(err)
        } else {
            RepositoryError::Database(err)
        }
    }
}
