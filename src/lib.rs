pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

// Make test_utils available for both unit tests and integration tests
pub mod test_utils;

use catalog::LandmarkCatalog;
use config::AppConfig;
use repositories::{SqliteCommentRepository, SqliteFavoriteRepository, SqliteUserRepository};
use services::{
    AvatarService, Clock, CommentService, EmailService, FavoriteService, InMemoryResetCodeStore,
    PasswordResetService, PasswordResetSettings, UserService,
};
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub avatar_service: Arc<AvatarService>,
    pub password_reset_service: Arc<PasswordResetService>,
    pub favorite_service: Arc<FavoriteService>,
    pub comment_service: Arc<CommentService>,
    pub catalog: Arc<LandmarkCatalog>,
}

impl AppState {
    /// Wires repositories and services over one pool.
    pub fn new(
        pool: SqlitePool,
        config: &AppConfig,
        catalog: Arc<LandmarkCatalog>,
        email_service: Box<dyn EmailService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let user_repository = Arc::new(SqliteUserRepository::new(pool.clone()));
        let favorite_repository = Arc::new(SqliteFavoriteRepository::new(pool.clone()));
        let comment_repository = Arc::new(SqliteCommentRepository::new(pool));

        let user_service = Arc::new(UserService::new(user_repository.clone()));
        let avatar_service = Arc::new(AvatarService::new(
            config.avatar_dir.clone(),
            config.max_avatar_bytes,
            user_repository.clone(),
        ));
        let password_reset_service = Arc::new(PasswordResetService::new(
            Arc::new(InMemoryResetCodeStore::new()),
            user_repository,
            user_service.clone(),
            email_service,
            clock,
            PasswordResetSettings {
                code_ttl: config.reset_code_ttl,
                require_token: config.require_reset_token,
            },
        ));
        let favorite_service = Arc::new(FavoriteService::new(favorite_repository));
        let comment_service = Arc::new(CommentService::new(comment_repository, catalog.clone()));

        Self {
            user_service,
            avatar_service,
            password_reset_service,
            favorite_service,
            comment_service,
            catalog,
        }
    }
}
