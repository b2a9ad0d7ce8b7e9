use thiserror::Error;

use crate::traits::UserStoreError;

/// The closed set of failures the authentication and user APIs can produce.
///
/// Every variant is terminal: each one reflects a caller-supplied defect (bad credentials, bad token,
/// insufficient role) rather than a transient condition, so nothing in the engine retries. Store I/O failures
/// are wrapped into [`AuthApiError::Database`] and propagated unchanged.
#[derive(Debug, Clone, Error)]
pub enum AuthApiError {
    #[error("{0}")]
    WrongCredential(String),
    #[error("{0}")]
    WrongPermission(String),
    #[error("{0}")]
    JwtValidation(String),
    #[error("{0}")]
    TokenCreation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Database error: {0}")]
    Database(String),
}

impl AuthApiError {
    pub fn wrong_credential<S: Into<String>>(msg: S) -> Self {
        Self::WrongCredential(msg.into())
    }

    pub fn wrong_permission<S: Into<String>>(msg: S) -> Self {
        Self::WrongPermission(msg.into())
    }

    pub fn jwt_validation<S: Into<String>>(msg: S) -> Self {
        Self::JwtValidation(msg.into())
    }

    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }
}

impl From<UserStoreError> for AuthApiError {
    fn from(e: UserStoreError) -> Self {
        Self::Database(e.to_string())
    }
}
