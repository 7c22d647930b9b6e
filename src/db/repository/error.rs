//! Errors raised by the storage backends.

use std::fmt;

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Where a storage failure happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Repository method, e.g. `create_user`
    pub operation: Option<String>,
    /// Record kind, e.g. `vacation`
    pub entity: Option<String>,
    pub entity_id: Option<String>,
    /// Free-form extra information (pool size, column name, attempt)
    pub details: Option<String>,
}

impl ErrorContext {
    fn is_empty(&self) -> bool {
        self.operation.is_none()
            && self.entity.is_none()
            && self.entity_id.is_none()
            && self.details.is_none()
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        let parts: Vec<String> = [
            self.operation.as_ref().map(|v| format!("operation={}", v)),
            self.entity.as_ref().map(|v| format!("entity={}", v)),
            self.entity_id.as_ref().map(|v| format!("id={}", v)),
            self.details.as_ref().map(|v| format!("details={}", v)),
        ]
        .into_iter()
        .flatten()
        .collect();
        write!(f, " [{}]", parts.join(", "))
    }
}

/// Storage failure reported by a repository backend.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// The backend cannot be reached: pool exhausted, connection refused, or
    /// the in-memory store switched to unhealthy. Always retryable.
    #[error("Database unavailable: {message}{context}")]
    Unavailable {
        message: String,
        context: ErrorContext,
    },

    /// A statement failed. Serialization failures are retryable.
    #[error("Query failed: {message}{context}")]
    Query {
        message: String,
        retryable: bool,
        context: ErrorContext,
    },

    #[error("{message}{context}")]
    NotFound {
        message: String,
        context: ErrorContext,
    },

    /// A uniqueness rule was violated (email, department name, one status per day).
    #[error("{message}{context}")]
    Duplicate {
        message: String,
        context: ErrorContext,
    },

    #[error("Invalid repository configuration: {0}")]
    Configuration(String),

    #[error("Internal storage error: {message}{context}")]
    Internal {
        message: String,
        context: ErrorContext,
    },
}

impl RepositoryError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
            retryable: false,
            context: ErrorContext::default(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Not-found error naming the record kind and id.
    pub fn missing(entity: &str, id: impl ToString) -> Self {
        let id = id.to_string();
        Self::NotFound {
            message: format!("{} {} not found", entity, id),
            context: ErrorContext {
                entity: Some(entity.to_string()),
                entity_id: Some(id),
                ..Default::default()
            },
        }
    }

    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::Duplicate {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }

    /// Whether running the same operation again may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Unavailable { .. } => true,
            Self::Query { retryable, .. } => *retryable,
            _ => false,
        }
    }

    /// Context of the failure; configuration errors carry none.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Self::Unavailable { context, .. }
            | Self::Query { context, .. }
            | Self::NotFound { context, .. }
            | Self::Duplicate { context, .. }
            | Self::Internal { context, .. } => Some(context),
            Self::Configuration(_) => None,
        }
    }

    fn context_mut(&mut self) -> Option<&mut ErrorContext> {
        match self {
            Self::Unavailable { context, .. }
            | Self::Query { context, .. }
            | Self::NotFound { context, .. }
            | Self::Duplicate { context, .. }
            | Self::Internal { context, .. } => Some(context),
            Self::Configuration(_) => None,
        }
    }

    /// Record the repository method that failed.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        if let Some(context) = self.context_mut() {
            context.operation = Some(operation.into());
        }
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        if let Some(context) = self.context_mut() {
            context.details = Some(details.into());
        }
        self
    }
}

#[cfg(feature = "postgres-repo")]
impl From<diesel::result::Error> for RepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};

        match err {
            Error::NotFound => RepositoryError::not_found("Record not found"),
            Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                RepositoryError::duplicate("Record already exists")
                    .with_details(info.message().to_string())
            }
            Error::DatabaseError(kind, info) => RepositoryError::Query {
                message: info.message().to_string(),
                retryable: matches!(kind, DatabaseErrorKind::SerializationFailure),
                context: ErrorContext {
                    details: Some(format!("kind={:?}", kind)),
                    ..Default::default()
                },
            },
            Error::DeserializationError(e) | Error::SerializationError(e) => {
                RepositoryError::internal(e.to_string())
            }
            other => RepositoryError::query(other.to_string()),
        }
    }
}

#[cfg(feature = "postgres-repo")]
impl From<diesel::r2d2::PoolError> for RepositoryError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        RepositoryError::unavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_carries_entity_context() {
        let err = RepositoryError::missing("vacation", 12);
        assert!(err.is_not_found());
        let context = err.context().unwrap();
        assert_eq!(context.entity.as_deref(), Some("vacation"));
        assert_eq!(context.entity_id.as_deref(), Some("12"));
        assert_eq!(err.to_string(), "vacation 12 not found [entity=vacation, id=12]");
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(RepositoryError::unavailable("pool exhausted").is_retryable());
        assert!(!RepositoryError::query("syntax error").is_retryable());
        assert!(!RepositoryError::duplicate("Email already registered").is_retryable());
        assert!(!RepositoryError::missing("user", 1).is_retryable());
    }

    #[test]
    fn test_empty_context_is_not_rendered() {
        let err = RepositoryError::duplicate("Email already registered");
        assert_eq!(err.to_string(), "Email already registered");
    }
}
