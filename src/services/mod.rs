pub mod avatar_service;
pub mod comment_service;
pub mod credentials;
pub mod email_service;
pub mod favorite_service;
pub mod password_reset_service;
pub mod reset_code_store;
pub mod user_service;

pub use avatar_service::{AvatarError, AvatarService};
pub use comment_service::{CommentService, CommentServiceError};
pub use email_service::{create_email_service, EmailError, EmailService, MockEmailService};
pub use favorite_service::{FavoriteService, FavoriteServiceError};
pub use password_reset_service::{
    Clock, PasswordResetError, PasswordResetService, PasswordResetSettings, SystemClock,
};
pub use reset_code_store::{InMemoryResetCodeStore, ResetCodeStore};
pub use user_service::{UserService, UserServiceError};
