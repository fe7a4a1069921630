use actix_web::{
    error::JsonPayloadError,
    http::{header, StatusCode},
    HttpRequest, HttpResponse, ResponseError,
};

use fc_core::errors::{AuthError, DomainError, ErrorCategory, TokenError};
use fc_shared::{error_codes, ErrorResponse, FieldErrors, ValidationErrorResponse};

const GENERAL_FIELD: &str = "General";

/// Converts a domain error into the response the client sees
///
/// Registration failures use the `{"errors": {...}}` validation shape. Every
/// other failure uses `{"error", "message", "timestamp"}`. Internal details
/// are logged, never returned.
pub fn handle_domain_error(error: &DomainError) -> HttpResponse {
    match error {
        DomainError::Auth(AuthError::EmailAlreadyRegistered) => HttpResponse::BadRequest()
            .json(ValidationErrorResponse::field("Email", error.to_string())),
        DomainError::Auth(AuthError::RegistrationRejected { reasons }) => {
            let mut errors = FieldErrors::new();
            errors.insert(GENERAL_FIELD.to_string(), reasons.clone());
            HttpResponse::BadRequest().json(ValidationErrorResponse { errors })
        }
        DomainError::ValidationFailed { errors } => {
            HttpResponse::BadRequest().json(ValidationErrorResponse {
                errors: errors.clone(),
            })
        }
        _ => error_response(error),
    }
}

fn error_response(error: &DomainError) -> HttpResponse {
    match error.category() {
        ErrorCategory::ValidationFailed => HttpResponse::BadRequest().json(ErrorResponse::new(
            error_codes::VALIDATION_ERROR,
            error.to_string(),
        )),
        ErrorCategory::BadRequest => HttpResponse::BadRequest().json(ErrorResponse::new(
            error_codes::BAD_REQUEST,
            error.to_string(),
        )),
        ErrorCategory::Conflict => HttpResponse::Conflict().json(ErrorResponse::new(
            error_codes::CONFLICT,
            error.to_string(),
        )),
        ErrorCategory::NotFound => HttpResponse::NotFound().json(ErrorResponse::new(
            error_codes::NOT_FOUND,
            error.to_string(),
        )),
        ErrorCategory::Unauthorized => unauthorized_response(error),
        ErrorCategory::Internal => {
            tracing::error!("Internal error: {}", error);
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                error_codes::INTERNAL_ERROR,
                "An internal error occurred",
            ))
        }
    }
}

fn unauthorized_response(error: &DomainError) -> HttpResponse {
    let (code, challenge) = match error {
        DomainError::Token(TokenError::TokenExpired) => (
            error_codes::TOKEN_EXPIRED,
            r#"Bearer error="invalid_token", error_description="The token expired""#,
        ),
        DomainError::Token(e) if e.is_access_token_rejection() => {
            (error_codes::TOKEN_INVALID, r#"Bearer error="invalid_token""#)
        }
        _ => (error_codes::UNAUTHORIZED, "Bearer"),
    };

    HttpResponse::Unauthorized()
        .insert_header((header::WWW_AUTHENTICATE, challenge))
        .json(ErrorResponse::new(code, error.to_string()))
}

/// Domain error usable as an actix error, e.g. from middleware
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        Self(error)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        handle_domain_error(&self.0).status()
    }

    fn error_response(&self) -> HttpResponse {
        handle_domain_error(&self.0)
    }
}

/// Malformed JSON bodies become a validation failure on `General`
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = match &err {
        JsonPayloadError::ContentType => "Expected a JSON body.".to_string(),
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            "Request body is too large.".to_string()
        }
        other => format!("Malformed JSON body: {}", other),
    };

    let mut errors = FieldErrors::new();
    errors.insert(GENERAL_FIELD.to_string(), vec![message]);
    ApiError(DomainError::ValidationFailed { errors }).into()
}
