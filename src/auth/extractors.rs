use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::token::Claims;
use crate::error::AppError;

/// The id of the user making the request.
///
/// Read from the [`Claims`] that `AuthMiddleware` stores in the request extensions,
/// so it only resolves on routes behind the middleware. Anywhere else it fails with
/// `AppError::Unauthorized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUserId(pub i32);

impl FromRequest for AuthenticatedUserId {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user_id = req.extensions().get::<Claims>().map(|claims| claims.sub);
        match user_id {
            Some(user_id) => ready(Ok(AuthenticatedUserId(user_id))),
            None => {
                let err = AppError::Unauthorized("Authentication required".to_string());
                ready(Err(err.into()))
            }
        }
    }
}
