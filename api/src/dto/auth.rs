use serde::{Deserialize, Serialize};
use validator::Validate;

use fc_core::domain::entities::identity::NewIdentity;
use fc_core::domain::entities::token::TokenPair;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(
        length(min = 1, message = "The Email field is required."),
        email(message = "The Email field is not a valid e-mail address.")
    )]
    #[serde(default)]
    pub email: String,

    #[validate(length(min = 1, message = "The Password field is required."))]
    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub first_name: String,

    #[serde(default)]
    pub last_name: String,
}

impl From<RegisterRequest> for NewIdentity {
    fn from(request: RegisterRequest) -> Self {
        NewIdentity::new(
            request.email,
            request.password,
            request.first_name,
            request.last_name,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(
        length(min = 1, message = "The Email field is required."),
        email(message = "The Email field is not a valid e-mail address.")
    )]
    #[serde(default)]
    pub email: String,

    #[validate(length(min = 1, message = "The Password field is required."))]
    #[serde(default)]
    pub password: String,
}

/// Missing and empty values are both reported as a bad request by the handler
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_in: pair.expires_in,
        }
    }
}
