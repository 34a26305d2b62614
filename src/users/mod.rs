// User profile endpoints: lookup, update and admin listing

pub mod handlers;
pub mod models;
pub mod service;

pub use handlers::{get_user_handler, list_users_handler, update_user_handler};
pub use models::UpdateUserRequest;
pub use service::UserService;
