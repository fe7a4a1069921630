//! JWT authentication middleware for protecting API endpoints.
//!
//! Extracts the bearer token from the Authorization header, verifies it with
//! the injected verifier and stores an [`AuthContext`] in the request
//! extensions for handlers to extract.

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, FromRequest, HttpMessage, HttpRequest, ResponseError,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
};

use fc_core::{
    domain::entities::{identity::UserId, token::AccessClaims},
    errors::{DomainError, TokenError},
    repositories::{CredentialStore, RefreshTokenRepository},
    services::token::TokenService,
};

use crate::handlers::error::ApiError;

/// Authenticated caller, resolved from the access token's subject claim
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: UserId,
    pub email: String,
    /// JWT ID for tracing
    pub jti: String,
}

impl AuthContext {
    pub fn from_claims(claims: AccessClaims) -> Result<Self, DomainError> {
        let user_id = claims
            .user_id()
            .map_err(|_| DomainError::Token(TokenError::InvalidClaims))?;
        Ok(Self {
            user_id,
            email: claims.email,
            jti: claims.jti,
        })
    }
}

/// Object-safe view of the token service used by the middleware
pub trait AccessTokenVerifier: Send + Sync {
    fn verify_access_token(&self, token: &str) -> Result<AccessClaims, DomainError>;
}

impl<R, C> AccessTokenVerifier for TokenService<R, C>
where
    R: RefreshTokenRepository,
    C: CredentialStore,
{
    fn verify_access_token(&self, token: &str) -> Result<AccessClaims, DomainError> {
        TokenService::verify_access_token(self, token)
    }
}

/// JWT authentication middleware factory
#[derive(Clone)]
pub struct JwtAuth {
    verifier: Arc<dyn AccessTokenVerifier>,
}

impl JwtAuth {
    pub fn new(verifier: Arc<dyn AccessTokenVerifier>) -> Self {
        Self { verifier }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
            verifier: Arc::clone(&self.verifier),
        }))
    }
}

/// JWT authentication middleware service
pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
    verifier: Arc<dyn AccessTokenVerifier>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let verifier = Arc::clone(&self.verifier);

        Box::pin(async move {
            let verified = match extract_bearer_token(&req) {
                Some(token) => verifier
                    .verify_access_token(&token)
                    .and_then(AuthContext::from_claims),
                None => Err(DomainError::Unauthorized),
            };

            match verified {
                Ok(auth_context) => {
                    req.extensions_mut().insert(auth_context);
                    service
                        .call(req)
                        .await
                        .map(ServiceResponse::map_into_left_body)
                }
                Err(error) => {
                    tracing::debug!(path = %req.path(), "Access token rejected: {}", error);
                    let response = ApiError(error).error_response();
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

/// Extracts Bearer token from Authorization header
fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token.to_string())
    } else {
        None
    }
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| ApiError(DomainError::Unauthorized).into());

        ready(result)
    }
}
