// Authentication module
// Password hashing, JWT issuance/validation, access guard and the auth endpoints

pub mod error;
pub mod guard;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use handlers::{
    change_password_handler, login_handler, logout_handler, refresh_handler, signup_handler,
};
pub use middleware::{AuthenticatedUser, RequireAdmin};
pub use models::{AuthResponse, IdentityClaims, Role, TokenPair, User, UserResponse};
pub use password::PasswordService;
pub use repository::{MemoryUserStore, PgUserStore, UserStore};
pub use service::AuthService;
pub use token::TokenService;
