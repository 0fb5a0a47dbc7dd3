use crate::error::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Lifetime of an issued token.
const TOKEN_TTL_HOURS: i64 = 24;

/// Claims carried by a bearer token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Id of the user the token was issued to.
    pub sub: i32,
    /// Expiry, seconds since the epoch.
    pub exp: usize,
    /// Issue time, seconds since the epoch.
    pub iat: usize,
}

fn jwt_secret() -> Result<String, AppError> {
    std::env::var("JWT_SECRET").map_err(|_| {
        log::error!("JWT_SECRET is not set; tokens cannot be issued or checked");
        AppError::Configuration("JWT_SECRET not set".into())
    })
}

/// Issues an HS256 token for `user_id`, valid for 24 hours and signed with `JWT_SECRET`.
pub fn generate_token(user_id: i32) -> Result<String, AppError> {
    let now = Utc::now();
    let expiration = now
        .checked_add_signed(Duration::hours(TOKEN_TTL_HOURS))
        .ok_or_else(|| AppError::InternalServerError("Token expiry out of range".into()))?;

    let claims = Claims {
        sub: user_id,
        exp: expiration.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret()?.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
}

/// Checks signature and expiry and returns the claims.
///
/// Any problem with the token itself is `AppError::Unauthorized`; a missing secret is
/// `AppError::Configuration`.
pub fn verify_token(token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret()?.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}
