//! Application state and factory
//!
//! This module holds the shared service state and builds the Actix-web
//! application with its middleware stack and routes.

use std::sync::Arc;

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App, HttpResponse,
};
use tracing_actix_web::TracingLogger;

use fc_core::repositories::{CredentialStore, RefreshTokenRepository};
use fc_core::services::{session::SessionService, token::TokenService};
use fc_shared::{CorsConfig, ServerConfig};

use crate::handlers::error::json_error_handler;
use crate::middleware::{auth::AccessTokenVerifier, cors::create_cors, JwtAuth};
use crate::routes::{
    auth::{login::login, logout::logout, refresh::refresh, register::register},
    users::me::me,
};

/// Services shared by all workers
pub struct AppState<R, C>
where
    R: RefreshTokenRepository + 'static,
    C: CredentialStore + 'static,
{
    pub session: Arc<SessionService<R, C>>,
    pub tokens: Arc<TokenService<R, C>>,
}

impl<R, C> AppState<R, C>
where
    R: RefreshTokenRepository + 'static,
    C: CredentialStore + 'static,
{
    pub fn new(session: SessionService<R, C>) -> Self {
        let tokens = Arc::clone(session.tokens());
        Self {
            session: Arc::new(session),
            tokens,
        }
    }
}

/// Create and configure the application with all dependencies
pub fn create_app<R, C>(
    app_state: web::Data<AppState<R, C>>,
    server: &ServerConfig,
    cors: &CorsConfig,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    R: RefreshTokenRepository + 'static,
    C: CredentialStore + 'static,
{
    let verifier: Arc<dyn AccessTokenVerifier> = app_state.tokens.clone();
    let jwt_auth = JwtAuth::new(verifier);

    let json_config = web::JsonConfig::default()
        .limit(server.max_payload_size)
        .error_handler(json_error_handler);

    App::new()
        .app_data(app_state)
        .app_data(json_config)
        // Middleware runs bottom-up: tracing sees every request, including CORS rejections
        .wrap(create_cors(cors))
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/auth")
                .route("/register", web::post().to(register::<R, C>))
                .route("/login", web::post().to(login::<R, C>))
                .route("/refresh", web::post().to(refresh::<R, C>))
                .route(
                    "/logout",
                    web::post().to(logout::<R, C>).wrap(jwt_auth.clone()),
                ),
        )
        .service(
            web::scope("/users")
                .wrap(jwt_auth)
                .route("/me", web::get().to(me::<R, C>)),
        )
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "fitclub-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": "NOT_FOUND",
        "message": "The requested resource was not found"
    }))
}
