//! SQLite transcript store implementation.
//!
//! Every persist call overwrites the full conversation for its
//! (user, variant, ordinal) key. The table carries no timestamp column, so
//! re-persisting an unchanged conversation leaves the row byte-identical.

use sqlx::Row;

use personet_core::repository::TranscriptStore;
use personet_types::chat::{Transcript, Turn};
use personet_types::error::RepositoryError;
use personet_types::persona::PersonaVariant;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `TranscriptStore`.
pub struct SqliteTranscriptStore {
    pool: DatabasePool,
}

impl SqliteTranscriptStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to a domain Transcript.
struct TranscriptRow {
    session_id: String,
    variant: String,
    topic: String,
    turns: String,
}

impl TranscriptRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            session_id: row.try_get("session_id")?,
            variant: row.try_get("variant")?,
            topic: row.try_get("topic")?,
            turns: row.try_get("turns")?,
        })
    }

    fn into_transcript(self) -> Result<Transcript, RepositoryError> {
        let variant: PersonaVariant = self
            .variant
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let turns: Vec<Turn> = serde_json::from_str(&self.turns)
            .map_err(|e| RepositoryError::Serialization(format!("invalid turns column: {e}")))?;
        Ok(Transcript {
            session_id: self.session_id,
            variant,
            topic: self.topic,
            turns,
        })
    }
}

impl TranscriptStore for SqliteTranscriptStore {
    async fn persist(
        &self,
        user_id: &str,
        ordinal: u32,
        transcript: &Transcript,
    ) -> Result<(), RepositoryError> {
        let turns = serde_json::to_string(&transcript.turns)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        sqlx::query(
            r#"INSERT INTO transcripts (user_id, variant, ordinal, session_id, topic, turns)
               VALUES (?, ?, ?, ?, ?, ?)
               ON CONFLICT (user_id, variant, ordinal) DO UPDATE SET
                   session_id = excluded.session_id,
                   topic = excluded.topic,
                   turns = excluded.turns"#,
        )
        .bind(user_id)
        .bind(transcript.variant.to_string())
        .bind(ordinal as i64)
        .bind(&transcript.session_id)
        .bind(&transcript.topic)
        .bind(turns)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn fetch(
        &self,
        user_id: &str,
        variant: PersonaVariant,
        ordinal: u32,
    ) -> Result<Option<Transcript>, RepositoryError> {
        let row = sqlx::query(
            r#"SELECT session_id, variant, topic, turns FROM transcripts
               WHERE user_id = ? AND variant = ? AND ordinal = ?"#,
        )
        .bind(user_id)
        .bind(variant.to_string())
        .bind(ordinal as i64)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let transcript_row = TranscriptRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(transcript_row.into_transcript()?))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_transcript() -> Transcript {
        Transcript {
            session_id: "U1/1".to_string(),
            variant: PersonaVariant::Tag,
            topic: "Leadership".to_string(),
            turns: vec![Turn::user("hi"), Turn::assistant("hello!")],
        }
    }

    async fn test_store() -> (tempfile::TempDir, SqliteTranscriptStore) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        let pool = DatabasePool::new(&url).await.unwrap();
        (dir, SqliteTranscriptStore::new(pool))
    }

    #[tokio::test]
    async fn test_persist_and_fetch_roundtrip() {
        let (_dir, store) = test_store().await;
        let transcript = sample_transcript();

        store.persist("U1", 1, &transcript).await.unwrap();

        let fetched = store
            .fetch("U1", PersonaVariant::Tag, 1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched, transcript);
    }

    #[tokio::test]
    async fn test_fetch_missing_returns_none() {
        let (_dir, store) = test_store().await;
        let fetched = store.fetch("U1", PersonaVariant::Tag, 7).await.unwrap();
        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn test_persist_overwrites_in_place() {
        let (_dir, store) = test_store().await;
        let mut transcript = sample_transcript();

        store.persist("U1", 1, &transcript).await.unwrap();
        transcript.turns.push(Turn::user("more"));
        transcript.turns.push(Turn::assistant("sure"));
        store.persist("U1", 1, &transcript).await.unwrap();

        let fetched = store
            .fetch("U1", PersonaVariant::Tag, 1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.turns.len(), 4);

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transcripts")
            .fetch_one(&store.pool.reader)
            .await
            .unwrap();
        assert_eq!(count.0, 1);
    }

    #[tokio::test]
    async fn test_unchanged_persist_is_byte_identical() {
        let (_dir, store) = test_store().await;
        let transcript = sample_transcript();

        store.persist("U1", 1, &transcript).await.unwrap();
        let first: (String,) = sqlx::query_as("SELECT turns FROM transcripts")
            .fetch_one(&store.pool.reader)
            .await
            .unwrap();

        store.persist("U1", 1, &transcript).await.unwrap();
        let second: (String,) = sqlx::query_as("SELECT turns FROM transcripts")
            .fetch_one(&store.pool.reader)
            .await
            .unwrap();

        assert_eq!(first.0, second.0);
    }

    #[tokio::test]
    async fn test_ordinals_and_variants_do_not_collide() {
        let (_dir, store) = test_store().await;
        let tag = sample_transcript();
        let mut episodic = sample_transcript();
        episodic.variant = PersonaVariant::Episodic;
        episodic.topic = "Free Topic".to_string();

        store.persist("U1", 1, &tag).await.unwrap();
        store.persist("U1", 2, &tag).await.unwrap();
        store.persist("U1", 1, &episodic).await.unwrap();

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transcripts")
            .fetch_one(&store.pool.reader)
            .await
            .unwrap();
        assert_eq!(count.0, 3);

        let fetched = store
            .fetch("U1", PersonaVariant::Episodic, 1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.topic, "Free Topic");
    }
}
