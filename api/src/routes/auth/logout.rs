use actix_web::{web, HttpResponse};

use crate::app::AppState;
use crate::handlers::error::handle_domain_error;
use crate::middleware::auth::AuthContext;

use fc_core::repositories::{CredentialStore, RefreshTokenRepository};

/// Handler for POST /auth/logout
///
/// Revokes every refresh token of the caller. Access tokens already handed
/// out stay valid until they expire.
///
/// # Headers
///
/// ```text
/// Authorization: Bearer {access_token}
/// ```
///
/// # Response
///
/// - 204 No Content
/// - 401 Unauthorized: Missing or invalid access token
pub async fn logout<R, C>(state: web::Data<AppState<R, C>>, auth: AuthContext) -> HttpResponse
where
    R: RefreshTokenRepository + 'static,
    C: CredentialStore + 'static,
{
    match state.session.logout(auth.user_id).await {
        Ok(revoked) => {
            tracing::info!(user_id = auth.user_id, revoked, "Logged out");
            HttpResponse::NoContent().finish()
        }
        Err(error) => handle_domain_error(&error),
    }
}
