pub mod auth;
pub mod cors;

pub use auth::{AccessTokenVerifier, AuthContext, JwtAuth};
pub use cors::create_cors;
