//! Password reset by emailed numeric code.
//!
//! `initiate` stores a code per email and mails it, `verify` checks it
//! without consuming it and hands out a reset token, `complete` writes the
//! new password and clears the user's pending request.

use crate::models::password_reset::{ResetRequest, VerifiedReset};
use crate::repositories::{user_repository::UserRepository, RepositoryError};
use crate::services::email_service::{EmailError, EmailService};
use crate::services::reset_code_store::ResetCodeStore;
use crate::services::user_service::{UserService, UserServiceError};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub const RESET_CODE_LENGTH: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum PasswordResetError {
    #[error("User not found")]
    UserNotFound,
    #[error("No reset request found for this email")]
    RequestNotFound,
    #[error("Reset code has expired")]
    Expired,
    #[error("Invalid reset code")]
    InvalidCode,
    #[error("Invalid reset token")]
    InvalidToken,
    #[error("Reset token is required")]
    TokenRequired,
    #[error("Email sending error: {0}")]
    Delivery(#[from] EmailError),
    #[error("User service error: {0}")]
    UserService(#[from] UserServiceError),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
pub struct PasswordResetSettings {
    pub code_ttl: Duration,
    pub require_token: bool,
}

impl Default for PasswordResetSettings {
    fn default() -> Self {
        Self {
            code_ttl: Duration::minutes(10),
            require_token: false,
        }
    }
}

pub struct PasswordResetService {
    store: Arc<dyn ResetCodeStore>,
    user_repository: Arc<dyn UserRepository>,
    user_service: Arc<UserService>,
    email_service: Box<dyn EmailService>,
    clock: Arc<dyn Clock>,
    settings: PasswordResetSettings,
}

impl PasswordResetService {
    pub fn new(
        store: Arc<dyn ResetCodeStore>,
        user_repository: Arc<dyn UserRepository>,
        user_service: Arc<UserService>,
        email_service: Box<dyn EmailService>,
        clock: Arc<dyn Clock>,
        settings: PasswordResetSettings,
    ) -> Self {
        Self {
            store,
            user_repository,
            user_service,
            email_service,
            clock,
            settings,
        }
    }

    /// Six digits, each drawn independently from 0-9.
    pub fn generate_reset_code() -> String {
        let mut rng = rand::thread_rng();
        (0..RESET_CODE_LENGTH)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect()
    }

    fn generate_token() -> String {
        let mut rng = rand::thread_rng();
        let bytes: Vec<u8> = (0..32).map(|_| rng.gen()).collect();
        hex::encode(bytes)
    }

    /// Stores a fresh code for `email` and mails it.
    ///
    /// A delivery failure is reported to the caller but the stored request
    /// is kept, so a code that did arrive through a retried send stays valid.
    pub async fn initiate(&self, email: &str) -> Result<(), PasswordResetError> {
        let user = self
            .user_repository
            .find_by_email(email)
            .await?
            .ok_or(PasswordResetError::UserNotFound)?;

        let code = Self::generate_reset_code();
        let expires_at = self.clock.now() + self.settings.code_ttl;

        if self
            .store
            .insert(email, ResetRequest::new(code.clone(), expires_at, user.id))
            .await
            .is_some()
        {
            tracing::debug!("Replaced pending reset request for {}", email);
        }

        tracing::info!("Sending password reset code to: {}", email);
        match self
            .email_service
            .send_reset_code(email, &code, self.settings.code_ttl.num_minutes())
            .await
        {
            Ok(()) => {
                tracing::info!("✅ Reset code sent successfully to: {}", email);
                Ok(())
            }
            Err(e) => {
                tracing::error!("❌ Failed to send reset code to {}: {:?}", email, e);
                Err(e.into())
            }
        }
    }

    /// Checks `code` against the pending request for `email`.
    ///
    /// Success leaves the request in place until `complete` or expiry; a wrong
    /// code does not count against it.
    pub async fn verify(&self, email: &str, code: &str) -> Result<VerifiedReset, PasswordResetError> {
        let now = self.clock.now();
        let pending = self
            .store
            .get(email)
            .await
            .ok_or(PasswordResetError::RequestNotFound)?;

        if pending.is_expired(now) {
            // Only evict the request we looked at, not one issued since
            let expires_at = pending.expires_at;
            self.store
                .remove_if(email, &|r| r.expires_at == expires_at && r.is_expired(now))
                .await;
            return Err(PasswordResetError::Expired);
        }

        if pending.code != code {
            return Err(PasswordResetError::InvalidCode);
        }

        let reset_token = Self::generate_token();
        let attached = self
            .store
            .attach_token(
                email,
                &|r| r.code == code && !r.is_expired(now),
                reset_token.clone(),
            )
            .await;
        if !attached {
            // Replaced or evicted between the read and the write
            return Err(PasswordResetError::RequestNotFound);
        }

        Ok(VerifiedReset {
            user_id: pending.user_id,
            reset_token,
        })
    }

    /// Writes the new password for `user_id` and clears one pending request
    /// belonging to that user.
    ///
    /// With a `reset_token` the token must match a pending request of the
    /// user; that request is consumed only once the password is stored.
    /// Without one the call is trusted unless the service was configured to
    /// require tokens. A user id with no row is not an error.
    pub async fn complete(
        &self,
        user_id: i64,
        new_password: &str,
        reset_token: Option<&str>,
    ) -> Result<(), PasswordResetError> {
        let token_owner = match reset_token {
            Some(token) => {
                let (email, _) = self
                    .store
                    .find_first(&|r| {
                        r.user_id == user_id && r.reset_token.as_deref() == Some(token)
                    })
                    .await
                    .ok_or(PasswordResetError::InvalidToken)?;
                Some(email)
            }
            None if self.settings.require_token => {
                return Err(PasswordResetError::TokenRequired);
            }
            None => None,
        };

        match self.user_service.set_password(user_id, new_password).await {
            Ok(()) => {}
            Err(UserServiceError::UserNotFound) => {
                tracing::warn!("Password reset completed for unknown user id {}", user_id);
            }
            Err(e) => return Err(e.into()),
        }

        let cleared = match (token_owner, reset_token) {
            (Some(email), Some(token)) => self
                .store
                .remove_if(&email, &|r| {
                    r.user_id == user_id && r.reset_token.as_deref() == Some(token)
                })
                .await
                .map(|_| email),
            _ => self
                .store
                .remove_first(&|r| r.user_id == user_id)
                .await
                .map(|(email, _)| email),
        };
        if let Some(email) = cleared {
            tracing::debug!("Cleared pending reset request for {}", email);
        }

        Ok(())
    }

    pub async fn purge_expired(&self) -> usize {
        self.store.purge_expired(self.clock.now()).await
    }

    pub async fn pending_requests(&self) -> usize {
        self.store.len().await
    }

    /// Periodically evicts expired requests for the life of the process.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: std::time::Duration) -> JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let purged = service.purge_expired().await;
                if purged > 0 {
                    tracing::debug!("Evicted {} expired reset requests", purged);
                }
            }
        })
    }
}
