//! Transcript readback endpoint.
//!
//! GET /api/v1/users/{user_id}/transcripts/{variant}/{ordinal}
//!
//! Returns the persisted full-conversation transcript for one session.

use axum::Json;
use axum::extract::{Path, State};

use personet_types::chat::Transcript;

use crate::http::error::AppError;
use crate::http::handlers::chat::parse_variant;
use crate::state::AppState;

/// GET /api/v1/users/{user_id}/transcripts/{variant}/{ordinal}
pub async fn get_transcript(
    State(state): State<AppState>,
    Path((user_id, variant, ordinal)): Path<(String, String, u32)>,
) -> Result<Json<Transcript>, AppError> {
    let variant = parse_variant(&variant)?;

    let transcript = state
        .chat_service
        .transcript(&user_id, variant, ordinal)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "no transcript for user '{user_id}' session ordinal {ordinal}"
            ))
        })?;

    Ok(Json(transcript))
}
