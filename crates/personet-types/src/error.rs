//! Error types shared across the workspace.

use thiserror::Error;

use crate::generation::GenerationError;

/// Malformed session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionKeyError {
    #[error("session id '{0}' has no '/<ordinal>' suffix")]
    MissingOrdinal(String),

    #[error("session ordinal '{0}' is not a positive integer")]
    InvalidOrdinal(String),

    #[error("session ordinal must be positive")]
    ZeroOrdinal,

    #[error("session id has an empty prefix")]
    EmptyPrefix,
}

/// Errors from persona, topic, and transcript storage backends.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error: {0}")]
    Connection(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("io error: {0}")]
    Io(String),
}

/// Errors surfaced by the chat orchestrator.
///
/// `InvalidSessionId`, `PersonaNotFound`, and `TopicDataNotFound` are fatal
/// to the triggering call and never leave a partially initialized session.
/// `Generation` aborts the current turn without mutating history.
/// Persistence failures are deliberately NOT represented here: they are
/// logged and swallowed after the response has already been produced.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("invalid session id: {0}")]
    InvalidSessionId(#[from] SessionKeyError),

    #[error("no persona document found for user '{user_id}'")]
    PersonaNotFound { user_id: String },

    #[error("no topic data found for user '{user_id}'")]
    TopicDataNotFound { user_id: String },

    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_key_error_converts_to_chat_error() {
        let err: ChatError = SessionKeyError::ZeroOrdinal.into();
        assert!(matches!(err, ChatError::InvalidSessionId(_)));
        assert!(err.to_string().starts_with("invalid session id"));
    }

    #[test]
    fn test_generation_error_converts_to_chat_error() {
        let err: ChatError = GenerationError::Timeout(30).into();
        assert!(matches!(err, ChatError::Generation(_)));
    }
}
