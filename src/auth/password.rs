use crate::error::AppError;
use bcrypt::{hash, verify, DEFAULT_COST};

/// Hashes a plaintext password for the `users.hashed_password` column.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

/// Checks `password` against a stored hash. A malformed hash is an error, not a mismatch.
pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(password, hashed_password)
        .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))
}
