use actix_web::{web, HttpResponse};

use crate::app::AppState;
use crate::dto::user::UserProfileResponse;
use crate::handlers::error::handle_domain_error;
use crate::middleware::auth::AuthContext;

use fc_core::repositories::{CredentialStore, RefreshTokenRepository};

/// Handler for GET /users/me
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "id": 1,
///     "email": "a@x.com",
///     "firstName": "Ann",
///     "lastName": "Lee",
///     "balance": 0.0
/// }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: Missing, expired or invalid access token
/// - 404 Not Found: The identity behind a valid token no longer exists
pub async fn me<R, C>(state: web::Data<AppState<R, C>>, auth: AuthContext) -> HttpResponse
where
    R: RefreshTokenRepository + 'static,
    C: CredentialStore + 'static,
{
    match state.session.current_user(auth.user_id).await {
        Ok(identity) => HttpResponse::Ok().json(UserProfileResponse::from(identity)),
        Err(error) => handle_domain_error(&error),
    }
}
