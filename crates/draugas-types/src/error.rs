use thiserror::Error;

use crate::llm::LlmError;

/// Errors from repository operations (used by trait definitions in draugas-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors surfaced by the chat operations.
///
/// Moderation rejections never appear here: they are retried and then
/// degraded to a fallback reply inside the orchestrator.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid mood: '{0}'")]
    InvalidMood(String),

    #[error("user '{0}' not found")]
    UserNotFound(String),

    #[error("invalid user id: '{0}'")]
    InvalidId(String),

    #[error("user already exists: {0}")]
    UserConflict(String),

    #[error("generation failed: {0}")]
    Generation(#[from] LlmError),

    #[error("persistence failed: {0}")]
    Persistence(#[from] RepositoryError),
}

impl ChatError {
    /// Whether the caller supplied bad input (as opposed to a service fault).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ChatError::MissingField(_)
                | ChatError::InvalidMood(_)
                | ChatError::InvalidId(_)
                | ChatError::UserNotFound(_)
                | ChatError::UserConflict(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_chat_error_from_llm_error() {
        let err: ChatError = LlmError::AuthenticationFailed.into();
        assert!(matches!(err, ChatError::Generation(_)));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_missing_field_is_client_error() {
        let err = ChatError::MissingField("username");
        assert_eq!(err.to_string(), "missing required field: username");
        assert!(err.is_client_error());
    }
}
