pub mod comment_handlers;
pub mod favorite_handlers;
pub mod landmark_handlers;
pub mod password_reset_handlers;
pub mod user_handlers;

pub use comment_handlers::{
    add_comment_handler, delete_comment_handler, delete_matching_comments_handler,
    landmark_comments_handler, user_reviews_handler,
};
pub use favorite_handlers::{add_favorite_handler, list_favorites_handler, remove_favorite_handler};
pub use landmark_handlers::{get_landmark_handler, list_landmarks_handler};
pub use password_reset_handlers::{
    complete_reset_handler, initiate_reset_handler, verify_reset_handler,
};
pub use user_handlers::{
    delete_user_handler, get_user_handler, login_handler, register_handler,
    update_password_handler, update_user_handler, upload_avatar_handler,
};
