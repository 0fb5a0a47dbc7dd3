//! Authentication on top of the user store: bcrypt password hashes, HS256 bearer
//! tokens, the middleware guarding `/api`, and the request/response bodies of the
//! login and registration routes.

pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::USERNAME_REGEX;
use crate::models::NewUser;

pub use extractors::AuthenticatedUserId;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{generate_token, verify_token, Claims};

/// Body of `POST /api/auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

/// Body of `POST /api/auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// 3 to 32 characters: letters, digits, underscores or hyphens.
    #[validate(
        length(min = 3, max = 32),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

impl RegisterRequest {
    /// Builds the row to insert, given the already-hashed password.
    pub fn to_new_user(&self, hashed_password: String) -> NewUser {
        NewUser::new(&self.email, hashed_password, &self.username)
    }
}

/// Returned by both login and registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Bearer token for the `Authorization` header.
    pub token: String,
    pub user_id: i32,
}
