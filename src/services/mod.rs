pub mod auth_service;
pub use auth_service::{AuthError, AuthService};

pub mod auth_service_impl;
pub use auth_service_impl::SeaOrmAuthService;

pub mod password;
pub use password::PasswordHasher;

pub mod user_service;
pub use user_service::{AccountInput, UserService};
