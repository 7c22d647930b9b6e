//! Error type shared by the service layer.

use thiserror::Error;

use crate::db::RepositoryError;

/// Failure of a business operation.
///
/// The HTTP layer maps each variant to a status code; the message is shown
/// to the client as is.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input breaks a business rule (400)
    #[error("{0}")]
    Validation(String),

    /// Referenced record does not exist or is not visible to the caller (404)
    #[error("{0}")]
    NotFound(String),

    /// Caller may not perform the operation (403)
    #[error("{0}")]
    Forbidden(String),

    /// Missing or invalid credentials (401)
    #[error("{0}")]
    Unauthorized(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Repository(e) => e.is_not_found(),
            _ => false,
        }
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Unwrap a lookup result or fail with `"{what} not found"`.
pub fn found<T>(value: Option<T>, what: &str) -> ServiceResult<T> {
    value.ok_or_else(|| ServiceError::NotFound(format!("{} not found", what)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_found_message() {
        let err = found::<i32>(None, "Time entry").unwrap_err();
        assert_eq!(err.to_string(), "Time entry not found");
        assert!(err.is_not_found());
        assert_eq!(found(Some(3), "x").unwrap(), 3);
    }

    #[test]
    fn test_repository_not_found_counts_as_not_found() {
        let err: ServiceError = RepositoryError::missing("User", 9).into();
        assert!(err.is_not_found());
        let err: ServiceError = RepositoryError::duplicate("Email already registered").into();
        assert!(!err.is_not_found());
    }
}
