//! SQLite topic store implementation.
//!
//! Implements `TopicStore` from `personet-core` using sqlx with split
//! read/write pools: raw queries, private Row structs, JSON columns for the
//! positional topic/description arrays.

use chrono::Utc;
use sqlx::Row;

use personet_core::repository::TopicStore;
use personet_types::error::RepositoryError;
use personet_types::persona::PersonaVariant;
use personet_types::topic::TopicDocument;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `TopicStore`.
pub struct SqliteTopicStore {
    pool: DatabasePool,
}

impl SqliteTopicStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to a domain TopicDocument.
struct TopicRow {
    topics: String,
    descriptions: String,
}

impl TopicRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            topics: row.try_get("topics")?,
            descriptions: row.try_get("descriptions")?,
        })
    }

    fn into_document(self) -> Result<TopicDocument, RepositoryError> {
        let topics: Vec<String> = serde_json::from_str(&self.topics)
            .map_err(|e| RepositoryError::Serialization(format!("invalid topics column: {e}")))?;
        let descriptions: Vec<String> = serde_json::from_str(&self.descriptions).map_err(|e| {
            RepositoryError::Serialization(format!("invalid descriptions column: {e}"))
        })?;
        Ok(TopicDocument {
            topics,
            descriptions,
        })
    }
}

impl TopicStore for SqliteTopicStore {
    async fn fetch(
        &self,
        user_id: &str,
        variant: PersonaVariant,
    ) -> Result<Option<TopicDocument>, RepositoryError> {
        let row = sqlx::query(
            "SELECT topics, descriptions FROM user_topics WHERE user_id = ? AND variant = ?",
        )
        .bind(user_id)
        .bind(variant.to_string())
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let topic_row =
                    TopicRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(topic_row.into_document()?))
            }
            None => Ok(None),
        }
    }

    async fn upsert(
        &self,
        user_id: &str,
        variant: PersonaVariant,
        document: &TopicDocument,
    ) -> Result<(), RepositoryError> {
        let topics = serde_json::to_string(&document.topics)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        let descriptions = serde_json::to_string(&document.descriptions)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        sqlx::query(
            r#"INSERT INTO user_topics (user_id, variant, topics, descriptions, updated_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT (user_id, variant) DO UPDATE SET
                   topics = excluded.topics,
                   descriptions = excluded.descriptions,
                   updated_at = excluded.updated_at"#,
        )
        .bind(user_id)
        .bind(variant.to_string())
        .bind(topics)
        .bind(descriptions)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> (tempfile::TempDir, SqliteTopicStore) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        let pool = DatabasePool::new(&url).await.unwrap();
        (dir, SqliteTopicStore::new(pool))
    }

    #[tokio::test]
    async fn test_fetch_missing_returns_none() {
        let (_dir, store) = test_store().await;
        let fetched = store.fetch("U1", PersonaVariant::Tag).await.unwrap();
        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn test_upsert_and_fetch_roundtrip() {
        let (_dir, store) = test_store().await;
        let document = TopicDocument {
            topics: vec!["Leadership".to_string(), "Travel".to_string()],
            descriptions: vec!["Leading a team".to_string(), "Places visited".to_string()],
        };

        store
            .upsert("U1", PersonaVariant::Tag, &document)
            .await
            .unwrap();

        let fetched = store.fetch("U1", PersonaVariant::Tag).await.unwrap();
        assert_eq!(fetched, Some(document));
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_row() {
        let (_dir, store) = test_store().await;
        let first = TopicDocument {
            topics: vec!["A".to_string()],
            descriptions: vec!["about A".to_string()],
        };
        let second = TopicDocument {
            topics: vec!["B".to_string()],
            descriptions: vec!["about B".to_string()],
        };

        store.upsert("U1", PersonaVariant::Tag, &first).await.unwrap();
        store.upsert("U1", PersonaVariant::Tag, &second).await.unwrap();

        let fetched = store.fetch("U1", PersonaVariant::Tag).await.unwrap();
        assert_eq!(fetched, Some(second));
    }

    #[tokio::test]
    async fn test_variants_are_isolated() {
        let (_dir, store) = test_store().await;
        let tag = TopicDocument {
            topics: vec!["Tag topic".to_string()],
            descriptions: vec!["d".to_string()],
        };

        store.upsert("U1", PersonaVariant::Tag, &tag).await.unwrap();

        assert!(store.fetch("U1", PersonaVariant::Episodic).await.unwrap().is_none());
        assert_eq!(store.fetch("U1", PersonaVariant::Tag).await.unwrap(), Some(tag));
    }
}
