use std::rc::Rc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{self, HeaderMap},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::token::TokenService;
use crate::error::AppError;
use crate::models::User;
use crate::store::UserStore;

/// Why a request carried no usable bearer credential.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("missing Authorization header")]
    Missing,
    #[error("Authorization header is not `Bearer <token>`")]
    Malformed,
}

/// Extracts the token from `Authorization: Bearer <token>`.
///
/// The header must split on whitespace into exactly a scheme and a token; the
/// scheme is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, CredentialError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(CredentialError::Missing)?
        .to_str()
        .map_err(|_| CredentialError::Malformed)?;

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(CredentialError::Malformed),
    }
}

/// Guards a scope: only requests with a valid token for an existing user get
/// through, and the resolved `User` is stored in the request extensions.
///
/// Needs `web::Data<TokenService>` and `web::Data<UserStore>` registered on
/// the app.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let user = authenticate(&req).await?;
            req.extensions_mut().insert(user);
            service.call(req).await
        })
    }
}

/// Resolves the caller of `req`.
///
/// Every client-side failure collapses into `AppError::Unauthorized`; the
/// specific reason is only logged. A failing user lookup is a server error.
async fn authenticate(req: &ServiceRequest) -> Result<User, AppError> {
    let deny = |reason: &dyn std::fmt::Display| {
        log::debug!("Rejected {} {}: {}", req.method(), req.path(), reason);
        AppError::Unauthorized
    };

    let token = bearer_token(req.headers()).map_err(|e| deny(&e))?;

    let tokens = req
        .app_data::<web::Data<TokenService>>()
        .ok_or_else(|| AppError::Internal("TokenService is not registered".into()))?;
    let claims = tokens.validate(token).map_err(|e| deny(&e))?;

    let users = req
        .app_data::<web::Data<UserStore>>()
        .ok_or_else(|| AppError::Internal("UserStore is not registered".into()))?;

    match users.get_user_by_email(&claims.email).await? {
        Some(user) if user.id == claims.user_id => Ok(user),
        Some(_) => Err(deny(&"token belongs to a previous account with this email")),
        None => Err(deny(&"token belongs to a user that no longer exists")),
    }
}
