use chrono::{DateTime, Utc};
use thiserror::Error;

pub type DecodeResult<T> = Result<T, DecodeError>;

/// Reasons a session token cannot be turned into an [`Identity`](crate::Identity).
///
/// Every variant means the same thing to callers: there is no usable session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("token is not a well-formed JWT: {0}")]
    Malformed(String),
    #[error("malformed claim payload: {0}")]
    InvalidJson(String),
    #[error("invalid claim '{0}' with value '{1}'")]
    InvalidClaim(&'static str, String),
    #[error("token expired at {0}")]
    Expired(DateTime<Utc>),
}

impl From<jsonwebtoken::errors::Error> for DecodeError {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match value.kind() {
            ErrorKind::Json(err) => Self::InvalidJson(err.to_string()),
            _ => Self::Malformed(value.to_string()),
        }
    }
}
