use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Avatar reference stored for users who never uploaded or chose one.
pub const DEFAULT_AVATAR_URI: &str = "@drawable/avatar2";

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub avatar_uri: String,
}

/// The public face of a user; never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub avatar_uri: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            avatar_uri: user.avatar_uri,
        }
    }
}

/// Columns a profile update may touch. Only these names ever reach the SET
/// clause of the generated UPDATE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Name,
    AvatarUri,
}

impl ProfileField {
    pub fn column(self) -> &'static str {
        match self {
            ProfileField::Name => "name",
            ProfileField::AvatarUri => "avatar_uri",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub avatar_uri: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.avatar_uri.is_none()
    }

    pub fn changes(&self) -> Vec<(ProfileField, &str)> {
        let mut changes = Vec::with_capacity(2);
        if let Some(name) = &self.name {
            changes.push((ProfileField::Name, name.as_str()));
        }
        if let Some(avatar_uri) = &self.avatar_uri {
            changes.push((ProfileField::AvatarUri, avatar_uri.as_str()));
        }
        changes
    }
}
