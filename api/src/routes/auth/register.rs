use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::app::AppState;
use crate::dto::{auth::RegisterRequest, to_field_errors};
use crate::handlers::error::handle_domain_error;

use fc_core::errors::DomainError;
use fc_core::repositories::{CredentialStore, RefreshTokenRepository};

/// Handler for POST /auth/register
///
/// # Request Body
///
/// ```json
/// {
///     "email": "a@x.com",
///     "password": "secret1",
///     "firstName": "Ann",
///     "lastName": "Lee"
/// }
/// ```
///
/// # Response
///
/// - 201 Created with an empty body
/// - 400 Bad Request: `{"errors": {"Email": ["..."]}}`
pub async fn register<R, C>(
    state: web::Data<AppState<R, C>>,
    request: web::Json<RegisterRequest>,
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

    match state.session.register(request.into_inner().into()).await {
        Ok(_) => HttpResponse::Created().finish(),
        Err(error) => handle_domain_error(&error),
    }
}
