use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use validator::Validate;

use super::task::Task;

lazy_static! {
    // alphanumeric, underscores, hyphens
    pub(crate) static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Column list shared by every query returning a `User`.
pub(crate) const USER_COLUMNS: &str =
    "id, email, hashed_password, is_active, is_superuser, is_verified, username";

/// A registered account.
///
/// Besides `username`, the columns are the standard ones an authentication layer
/// keeps for a user: a unique email, the password hash and three status flags.
/// `tasks` is not a column; the user store fills it with a second, batched query.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub hashed_password: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub is_verified: bool,
    pub username: String,
    #[sqlx(skip)]
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "User(id={} username={} email={})",
            self.id, self.username, self.email
        )
    }
}

/// Values needed to insert a user row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub hashed_password: String,
    pub username: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub is_verified: bool,
}

impl NewUser {
    /// An active, unverified, non-superuser account. The email is stored lowercased.
    pub fn new(email: &str, hashed_password: String, username: &str) -> Self {
        Self {
            email: email.trim().to_lowercase(),
            hashed_password,
            username: username.to_string(),
            is_active: true,
            is_superuser: false,
            is_verified: false,
        }
    }
}

/// Partial update submitted by a user for their own account.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UserUpdate {
    #[validate(
        length(min = 3, max = 32),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 6))]
    pub password: Option<String>,
}

/// Column changes applied by the user store; `None` leaves a column untouched.
#[derive(Debug, Default, Clone)]
pub struct UserChanges {
    pub email: Option<String>,
    pub hashed_password: Option<String>,
    pub username: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.hashed_password.is_none() && self.username.is_none()
    }
}
