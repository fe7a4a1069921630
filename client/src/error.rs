use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced to the consuming application
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("Token storage error: {0}")]
    Storage(String),

    #[error("Invalid API base URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Not authenticated")]
    NotAuthenticated,
}

impl ClientError {
    /// Status code returned by the API, if the error came from a response
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status(),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(error: std::io::Error) -> Self {
        ClientError::Storage(error.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(error: serde_json::Error) -> Self {
        ClientError::Storage(format!("corrupt token file: {}", error))
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
