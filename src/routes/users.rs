use crate::{
    auth::{hash_password, AuthenticatedUserId},
    db::UserDb,
    error::AppError,
    models::{UserChanges, UserUpdate},
};
use actix_web::{delete, get, patch, web, HttpResponse, Responder};
use validator::Validate;

/// Returns the authenticated user together with all of their tasks.
///
/// ## Responses:
/// - `200 OK`: the `User`, with `tasks` ordered by id.
/// - `401 Unauthorized`: missing or invalid token.
/// - `404 Not Found`: the account behind the token no longer exists.
#[get("/me")]
pub async fn get_me(
    mut users: UserDb,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let user = users
        .get(user_id.0)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(HttpResponse::Ok().json(user))
}

/// Changes username, email and/or password of the authenticated user.
/// Fields left out of the body are not touched.
#[patch("/me")]
pub async fn update_me(
    mut users: UserDb,
    user_id: AuthenticatedUserId,
    update: web::Json<UserUpdate>,
) -> Result<impl Responder, AppError> {
    update.validate()?;
    let update = update.into_inner();

    let hashed_password = match update.password.as_deref() {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };
    let changes = UserChanges {
        email: update.email,
        hashed_password,
        username: update.username,
    };

    let user = users
        .update(user_id.0, changes)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(HttpResponse::Ok().json(user))
}

/// Deletes the authenticated user's account and, with it, every task they own.
#[delete("/me")]
pub async fn delete_me(
    mut users: UserDb,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    if !users.delete(user_id.0).await? {
        return Err(AppError::NotFound("User not found".into()));
    }
    Ok(HttpResponse::NoContent().finish())
}
