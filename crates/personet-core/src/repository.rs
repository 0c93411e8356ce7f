//! Source and store trait definitions.
//!
//! These are the ports the infrastructure layer implements: persona
//! documents, topic documents, and durable transcripts. All use native
//! async fn in traits (RPITIT, Rust 2024 edition).

use personet_types::chat::Transcript;
use personet_types::error::RepositoryError;
use personet_types::persona::{PersonaDocument, PersonaVariant};
use personet_types::topic::TopicDocument;

/// Resolves a user id to persona content for a given variant.
///
/// Implementations live in personet-infra (e.g., `FsPersonaSource`).
pub trait PersonaSource: Send + Sync {
    /// Load the persona document for a user, or `None` when no document
    /// exists for that user and variant.
    fn load(
        &self,
        user_id: &str,
        variant: PersonaVariant,
    ) -> impl std::future::Future<Output = Result<Option<PersonaDocument>, RepositoryError>> + Send;
}

/// Per-user topic documents, one per persona variant.
///
/// Implementations live in personet-infra (e.g., `SqliteTopicStore`).
pub trait TopicStore: Send + Sync {
    /// Fetch a user's topic document, or `None` when none has been stored.
    fn fetch(
        &self,
        user_id: &str,
        variant: PersonaVariant,
    ) -> impl std::future::Future<Output = Result<Option<TopicDocument>, RepositoryError>> + Send;

    /// Store or replace a user's topic document.
    fn upsert(
        &self,
        user_id: &str,
        variant: PersonaVariant,
        document: &TopicDocument,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}

/// Durable sink for session transcripts.
///
/// `persist` writes the entire current history as a full overwrite keyed by
/// `(user_id, variant, ordinal)` -- persisting an unchanged transcript twice
/// yields identical stored state.
pub trait TranscriptStore: Send + Sync {
    fn persist(
        &self,
        user_id: &str,
        ordinal: u32,
        transcript: &Transcript,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Read back a previously persisted transcript.
    fn fetch(
        &self,
        user_id: &str,
        variant: PersonaVariant,
        ordinal: u32,
    ) -> impl std::future::Future<Output = Result<Option<Transcript>, RepositoryError>> + Send;
}
