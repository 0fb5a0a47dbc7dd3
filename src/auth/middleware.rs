use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::token::verify_token;
use crate::error::AppError;

/// Paths reachable without a bearer token.
const PUBLIC_PATHS: [&str; 3] = ["/health", "/api/auth/login", "/api/auth/register"];

fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.iter().any(|public| path == *public)
}

/// Requires `Authorization: Bearer <token>` on everything except [`PUBLIC_PATHS`].
///
/// On success the decoded [`Claims`](crate::auth::Claims) are stored in the request
/// extensions, where [`AuthenticatedUserId`](crate::auth::AuthenticatedUserId) picks
/// them up.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if is_public(req.path()) {
            return Box::pin(self.service.call(req));
        }

        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        let claims = match token {
            Some(token) => verify_token(token),
            None => Err(AppError::Unauthorized("Missing token".into())),
        };

        match claims {
            Ok(claims) => {
                log::debug!("Authenticated user {} for {}", claims.sub, req.path());
                req.extensions_mut().insert(claims);
                Box::pin(self.service.call(req))
            }
            Err(app_err) => {
                log::debug!("Rejected request to {}: {}", req.path(), app_err);
                Box::pin(async move { Err(app_err.into()) })
            }
        }
    }
}
