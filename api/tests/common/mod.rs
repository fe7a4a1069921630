//! Shared setup for the HTTP integration tests

#![allow(dead_code)]

use std::sync::Arc;

use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse},
    http::{header, StatusCode},
    test, web, App, Error,
};
use chrono::{Duration, Utc};
use serde_json::json;

use fc_api::{create_app, AppState};
use fc_core::{
    AccessClaims, CredentialStore, InMemoryCredentialStore, InMemoryRefreshTokenRepository,
    SessionService, SigningKeys, TokenService, TokenServiceConfig,
};
use fc_shared::{CorsConfig, ServerConfig};

pub const SECRET: &str = "integration-test-secret-with-enough-bytes";

pub type Repo = InMemoryRefreshTokenRepository;
pub type Store = InMemoryCredentialStore;

pub struct TestContext {
    pub state: web::Data<AppState<Repo, Store>>,
    pub repository: Arc<Repo>,
    pub credentials: Arc<Store>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(TokenServiceConfig::default())
    }

    pub fn with_config(config: TokenServiceConfig) -> Self {
        let repository = Arc::new(InMemoryRefreshTokenRepository::new());
        let credentials = Arc::new(InMemoryCredentialStore::new());
        let tokens = Arc::new(TokenService::new(
            repository.clone(),
            credentials.clone(),
            SigningKeys::from_secret(SECRET).unwrap(),
            config,
        ));
        let session = SessionService::new(tokens, credentials.clone());

        Self {
            state: web::Data::new(AppState::new(session)),
            repository,
            credentials,
        }
    }

    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody>,
            Error = Error,
            InitError = (),
        >,
    > {
        create_app(
            self.state.clone(),
            &ServerConfig::default(),
            &CorsConfig::development(),
        )
    }

    /// Access token for `email` that expired twenty minutes ago
    pub async fn expired_access_token(&self, email: &str) -> String {
        let identity = self
            .credentials
            .find_by_email(email)
            .await
            .unwrap()
            .expect("identity exists");
        let config = self.state.tokens.config();
        let claims = AccessClaims::issued_at(
            &identity,
            &config.issuer,
            &config.audience,
            Utc::now() - Duration::minutes(35),
            Duration::minutes(15),
        );
        self.state.tokens.sign_claims(&claims).unwrap()
    }
}

pub async fn register<S, B>(app: &S, email: &str, password: &str) -> StatusCode
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "email": email,
            "password": password,
            "firstName": "Ann",
            "lastName": "Lee"
        }))
        .to_request();
    test::call_service(app, req).await.status()
}

pub async fn login<S, B>(app: &S, email: &str, password: &str) -> serde_json::Value
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::OK, "login should succeed");
    test::read_body_json(resp).await
}

pub async fn get_me<S, B>(app: &S, access_token: &str) -> ServiceResponse<B>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::get()
        .uri("/users/me")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", access_token)))
        .to_request();
    test::call_service(app, req).await
}

pub async fn refresh<S, B>(app: &S, body: serde_json::Value) -> ServiceResponse<B>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/auth/refresh")
        .set_json(body)
        .to_request();
    test::call_service(app, req).await
}
