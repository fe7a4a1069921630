use actix_web::{web, HttpResponse};

use crate::app::AppState;
use crate::dto::auth::{RefreshTokenRequest, TokenResponse};
use crate::handlers::error::handle_domain_error;

use fc_core::repositories::{CredentialStore, RefreshTokenRepository};

/// Handler for POST /auth/refresh
///
/// Exchanges a refresh token for a new token pair. Without rotation the
/// same refresh token is handed back.
///
/// # Request Body
///
/// ```json
/// {
///     "refreshToken": "9f86d0..."
/// }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// Same shape as the login response.
///
/// ## Errors
/// - 400 Bad Request: Refresh token missing or empty
/// - 401 Unauthorized: Unknown, revoked or expired refresh token
pub async fn refresh<R, C>(
    state: web::Data<AppState<R, C>>,
    request: Option<web::Json<RefreshTokenRequest>>,
) -> HttpResponse
where
    R: RefreshTokenRepository + 'static,
    C: CredentialStore + 'static,
{
    let value = request.and_then(|r| r.into_inner().refresh_token);

    match state.session.refresh(value.as_deref()).await {
        Ok(pair) => HttpResponse::Ok().json(TokenResponse::from(pair)),
        Err(error) => {
            tracing::debug!("Refresh rejected: {}", error);
            handle_domain_error(&error)
        }
    }
}
