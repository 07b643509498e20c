use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Timestamp layout used for comment dates, e.g. `07.03.2025 18:42`.
pub const COMMENT_DATE_FORMAT: &str = "%d.%m.%Y %H:%M";

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub user_id: i64,
    pub landmark_id: i64,
    pub comment: String,
    pub date: String,
}

/// A comment as shown under a landmark, joined with its author.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LandmarkComment {
    pub id: i64,
    pub user_id: i64,
    pub comment: String,
    pub date: String,
    pub user_name: String,
    pub avatar_uri: String,
}

/// A comment as shown in its author's review list, joined with the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub landmark_id: i64,
    pub landmark_name: String,
    pub comment: String,
    pub date: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
    pub user_id: i64,
    pub landmark_id: i64,
    pub comment: String,
    /// Sent by older clients; the server always stamps its own time.
    #[serde(default)]
    pub date: Option<String>,
}
