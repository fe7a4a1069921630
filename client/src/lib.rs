//! Client side of FitClub sessions
//!
//! - `storage` - durable key-value storage for the token pair
//! - `cache` - in-memory token cell mirrored to storage
//! - `pipeline` - request pipeline that attaches the access token and renews
//!   it once on a 401
//! - `auth_client` - register, login, logout and profile calls

pub mod auth_client;
pub mod cache;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod storage;

pub use auth_client::AuthClient;
pub use cache::{TokenCache, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
pub use error::{ClientError, ClientResult};
pub use models::{LoginRequest, RegisterRequest, TokenResponse, UserProfile};
pub use pipeline::AuthPipeline;
pub use storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage};
