use chrono::{DateTime, Utc};

/// An outstanding password reset for one email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetRequest {
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub user_id: i64,
    /// Issued by a successful verification; consumed by completion.
    pub reset_token: Option<String>,
}

impl ResetRequest {
    pub fn new(code: String, expires_at: DateTime<Utc>, user_id: i64) -> Self {
        Self {
            code,
            expires_at,
            user_id,
            reset_token: None,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Result of a successful code verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedReset {
    pub user_id: i64,
    pub reset_token: String,
}
