use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecurityError {
    #[error("no active session")]                 Unauthenticated,
    #[error("unauthorized - missing required role")]    Forbidden,
}
