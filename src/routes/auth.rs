use crate::{
    auth::{
        generate_token, hash_password, verify_password, AuthResponse, LoginRequest, RegisterRequest,
    },
    db::UserDb,
    error::AppError,
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// Creates the account through the user store and returns a token for it.
///
/// ## Responses:
/// - `201 Created`: `AuthResponse`.
/// - `400 Bad Request`: missing fields, or the email is already registered.
/// - `422 Unprocessable Entity`: a field failed validation.
#[post("/register")]
pub async fn register(
    mut users: UserDb,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    if users.get_by_email(&register_data.email).await?.is_some() {
        return Err(AppError::BadRequest("Email already registered".into()));
    }

    let password_hash = hash_password(&register_data.password)?;
    let user = users.create(register_data.to_new_user(password_hash)).await?;

    let token = generate_token(user.id)?;

    Ok(HttpResponse::Created().json(AuthResponse {
        token,
        user_id: user.id,
    }))
}

/// Login user
///
/// Checks the credentials against the user store and returns a fresh token.
/// Unknown email, wrong password and deactivated accounts all get the same `401`.
#[post("/login")]
pub async fn login(
    mut users: UserDb,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let user = users
        .get_by_email(&login_data.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".into()))?;

    if !verify_password(&login_data.password, &user.hashed_password)? {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }
    if !user.is_active {
        log::info!("Login refused for inactive {}", user);
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let token = generate_token(user.id)?;
    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user_id: user.id,
    }))
}
