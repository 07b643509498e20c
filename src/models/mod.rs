pub mod comment;
pub mod favorite;
pub mod landmark;
pub mod password_reset;
pub mod user;

pub use comment::{Comment, LandmarkComment, NewComment, Review, COMMENT_DATE_FORMAT};
pub use favorite::Favorite;
pub use landmark::Landmark;
pub use password_reset::{ResetRequest, VerifiedReset};
pub use user::{ProfileField, ProfileUpdate, User, UserProfile, DEFAULT_AVATAR_URI};
