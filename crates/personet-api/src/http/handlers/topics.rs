//! Topic administration endpoints.
//!
//! PUT /api/v1/users/{user_id}/topics/{variant} — store or replace topics
//! GET /api/v1/users/{user_id}/topics/{variant} — read current topics
//!
//! Topics are resolved positionally: session ordinal N maps to the Nth
//! topic, with out-of-range ordinals falling back to freeform chat.

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use personet_types::topic::TopicDocument;

use crate::http::error::AppError;
use crate::http::handlers::chat::parse_variant;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateTopicsRequest {
    pub topics: Vec<String>,
    /// Positionally paired with `topics`. May be empty for undescribed
    /// topics, but a partial list is rejected.
    #[serde(default)]
    pub descriptions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TopicsResponse {
    pub topics: Vec<String>,
    pub descriptions: Vec<String>,
}

/// PUT /api/v1/users/{user_id}/topics/{variant}
pub async fn update_topics(
    State(state): State<AppState>,
    Path((user_id, variant)): Path<(String, String)>,
    Json(body): Json<UpdateTopicsRequest>,
) -> Result<Json<TopicsResponse>, AppError> {
    let variant = parse_variant(&variant)?;

    if !body.descriptions.is_empty() && body.descriptions.len() != body.topics.len() {
        return Err(AppError::Validation(format!(
            "descriptions must be empty or match topics: {} topics, {} descriptions",
            body.topics.len(),
            body.descriptions.len()
        )));
    }

    let document = TopicDocument {
        topics: body.topics,
        descriptions: body.descriptions,
    };
    state
        .chat_service
        .update_topics(&user_id, variant, &document)
        .await?;

    Ok(Json(TopicsResponse {
        topics: document.topics,
        descriptions: document.descriptions,
    }))
}

/// GET /api/v1/users/{user_id}/topics/{variant}
pub async fn get_topics(
    State(state): State<AppState>,
    Path((user_id, variant)): Path<(String, String)>,
) -> Result<Json<TopicsResponse>, AppError> {
    let variant = parse_variant(&variant)?;

    let document = state
        .chat_service
        .topics(&user_id, variant)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no topics stored for user '{user_id}'")))?;

    Ok(Json(TopicsResponse {
        topics: document.topics,
        descriptions: document.descriptions,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_defaults_descriptions() {
        let body: UpdateTopicsRequest =
            serde_json::from_str(r#"{ "topics": ["A", "B"] }"#).unwrap();
        assert_eq!(body.topics.len(), 2);
        assert!(body.descriptions.is_empty());
    }
}
