use models::errors::ModelError;
use thiserror::Error;

/// Business errors for auth workflows. Client-facing variants carry the
/// message returned to the caller; the rest are logged and hidden.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    InvalidCode(String),
    #[error("{0}")]
    NotFound(String),
    #[error("hashing error: {0}")]
    HashError(String),
    #[error("token error: {0}")]
    TokenError(String),
    #[error("email delivery error: {0}")]
    Email(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Validation(_) => 1001,
            AuthError::Conflict(_) => 1002,
            AuthError::NotFound(_) => 1003,
            AuthError::Unauthorized(_) => 1004,
            AuthError::InvalidCode(_) => 1005,
            AuthError::HashError(_) => 1101,
            AuthError::TokenError(_) => 1102,
            AuthError::Email(_) => 1103,
            AuthError::Repository(_) => 1200,
        }
    }

    /// Downstream failures whose details must not reach the caller.
    pub fn is_internal(&self) -> bool {
        self.code() >= 1100
    }

    pub fn validation(msg: impl Into<String>) -> Self { AuthError::Validation(msg.into()) }
    pub fn unauthorized(msg: impl Into<String>) -> Self { AuthError::Unauthorized(msg.into()) }
    pub fn not_found(msg: impl Into<String>) -> Self { AuthError::NotFound(msg.into()) }
}

impl From<ModelError> for AuthError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Duplicate(_) => AuthError::Conflict("Email already registered".into()),
            ModelError::NotFound(what) => AuthError::NotFound(format!("{what} not found")),
            ModelError::Validation(msg) => AuthError::Validation(msg),
            ModelError::Db(msg) => AuthError::Repository(msg),
        }
    }
}
