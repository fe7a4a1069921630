use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::app::AppState;
use crate::dto::{
    auth::{LoginRequest, TokenResponse},
    to_field_errors,
};
use crate::handlers::error::handle_domain_error;

use fc_core::errors::DomainError;
use fc_core::repositories::{CredentialStore, RefreshTokenRepository};

/// Handler for POST /auth/login
///
/// Verifies the credentials and issues a fresh token pair.
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "accessToken": "eyJ...",
///     "refreshToken": "9f86d0...",
///     "expiresIn": 900
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Missing or malformed email or password
/// - 401 Unauthorized: Unknown email or wrong password, indistinguishable
pub async fn login<R, C>(
    state: web::Data<AppState<R, C>>,
    request: web::Json<LoginRequest>,
) -> HttpResponse
where
    R: RefreshTokenRepository + 'static,
    C: CredentialStore + 'static,
{
    if let Err(errors) = request.validate() {
        return handle_domain_error(&DomainError::ValidationFailed {
            errors: to_field_errors(&errors),
        });
    }

    match state.session.login(&request.email, &request.password).await {
        Ok(pair) => HttpResponse::Ok().json(TokenResponse::from(pair)),
        Err(error) => handle_domain_error(&error),
    }
}
