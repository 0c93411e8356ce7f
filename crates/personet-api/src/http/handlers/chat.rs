//! Blocking and SSE streaming chat endpoints.
//!
//! POST /api/v1/chat        — blocking, returns the full response as JSON
//! POST /api/v1/chat/stream — streams response fragments as Server-Sent Events
//!
//! SSE event types:
//! - `text_delta` — incremental text: `{ "text": "..." }`
//! - `done` — stream complete: `{}`
//! - `error` — error occurred: `{ "message": "..." }`

use std::convert::Infallible;
use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use personet_types::persona::PersonaVariant;

use crate::http::error::AppError;
use crate::state::AppState;

/// Request body shared by both chat endpoints.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub user_id: String,
    /// `<prefix>/<ordinal>` session identifier.
    pub session_id: String,
    /// `"tag"` or `"episodic"` (also accepts `"epi"`).
    pub variant: String,
    /// The user message to send.
    pub input: String,
}

/// Response body for the blocking chat endpoint.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub response: String,
}

pub(crate) fn parse_variant(raw: &str) -> Result<PersonaVariant, AppError> {
    raw.parse().map_err(AppError::Validation)
}

/// POST /api/v1/chat — blocking chat turn.
pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let variant = parse_variant(&body.variant)?;

    let response = state
        .chat_service
        .chat(&body.user_id, &body.input, &body.session_id, variant)
        .await?;

    Ok(Json(ChatResponse {
        session_id: body.session_id,
        response,
    }))
}

/// POST /api/v1/chat/stream — SSE streaming chat turn.
///
/// Session resolution errors (bad session id, missing persona or topic
/// data) surface as HTTP error statuses before the stream starts;
/// mid-stream failures arrive as an `error` event.
pub async fn chat_stream(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let variant = parse_variant(&body.variant)?;

    let fragments = state
        .chat_service
        .chat_stream(&body.user_id, &body.input, &body.session_id, variant)
        .await?;

    let sse_stream = async_stream::stream! {
        let mut fragments = std::pin::pin!(fragments);

        while let Some(item) = fragments.next().await {
            match item {
                Ok(text) => {
                    let data = serde_json::json!({ "text": text });
                    yield Ok::<_, Infallible>(
                        Event::default().event("text_delta").data(data.to_string()),
                    );
                }
                Err(e) => {
                    let data = serde_json::json!({ "message": e.to_string() });
                    yield Ok(Event::default().event("error").data(data.to_string()));
                    return;
                }
            }
        }

        yield Ok(Event::default().event("done").data("{}"));
    };

    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_deserializes() {
        let body: ChatRequest = serde_json::from_str(
            r#"{
                "user_id": "U1",
                "session_id": "U1/1",
                "variant": "tag",
                "input": "hello"
            }"#,
        )
        .unwrap();
        assert_eq!(body.user_id, "U1");
        assert_eq!(body.session_id, "U1/1");
    }

    #[test]
    fn test_parse_variant_accepts_aliases() {
        assert_eq!(parse_variant("tag").unwrap(), PersonaVariant::Tag);
        assert_eq!(parse_variant("episodic").unwrap(), PersonaVariant::Episodic);
        assert_eq!(parse_variant("epi").unwrap(), PersonaVariant::Episodic);
        assert!(parse_variant("other").is_err());
    }
}
