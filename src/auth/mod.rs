pub mod password;
pub mod token;

use thiserror::Error;

pub use password::PasswordHasher;
pub use token::{Claims, TokenKeys};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),
}
