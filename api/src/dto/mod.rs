//! Request and response bodies

pub mod auth;
pub mod user;

pub use auth::{LoginRequest, RefreshTokenRequest, RegisterRequest, TokenResponse};
pub use user::UserProfileResponse;

use fc_shared::FieldErrors;
use validator::ValidationErrors;

/// Flattens validator output into `{"Field": ["message", ...]}`
///
/// Field names are rendered in PascalCase, matching the keys clients already
/// expect for store-side rejections such as `Email`.
pub fn to_field_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut out = FieldErrors::new();

    for (field, field_errors) in errors.field_errors() {
        let messages = field_errors
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("The {} field is invalid.", pascal_case(field)))
            })
            .collect();
        out.insert(pascal_case(field), messages);
    }

    out
}

fn pascal_case(field: &str) -> String {
    field
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
