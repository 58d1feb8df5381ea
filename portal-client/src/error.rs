use common_auth::DecodeError;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Error payload the backend attaches to non-2xx responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub action_required: Option<String>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {path} failed: {message}")]
    Transport { path: String, message: String },
    #[error("HTTP {status}: {}", .body.message.as_deref().unwrap_or("no message"))]
    Status { status: StatusCode, body: ErrorBody },
    #[error("failed to decode response body: {0}")]
    Decode(String),
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Backend-provided message, suitable for showing on a form.
    pub fn message(&self) -> Option<&str> {
        match self {
            ApiError::Status { body, .. } => body.message.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("{message}")]
    VerificationRequired { message: String },
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
    #[error("login response did not include a token")]
    MissingToken,
    #[error("network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    /// The token could not be decoded; the session has been cleared.
    #[error("please log in")]
    InvalidToken(#[source] DecodeError),
    #[error("no active session")]
    NotAuthenticated,
    #[error("session changed while the request was in flight")]
    Superseded,
    #[error(transparent)]
    Login(#[from] LoginError),
    #[error(transparent)]
    Api(#[from] ApiError),
}
