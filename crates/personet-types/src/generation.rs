//! Generation request/response types.
//!
//! These model the boundary to the text-generation pipeline: a request is a
//! system prompt plus the replayed conversation and the new input; a
//! response is the full text, or an ordered sequence of text fragments whose
//! concatenation equals the full text.

use serde::{Deserialize, Serialize};

use crate::chat::TurnRole;

/// A single message sent to the generation provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationMessage {
    pub role: TurnRole,
    pub content: String,
}

/// Request to a generation provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub model: String,
    /// Replayed history plus the new user input, in chronological order.
    pub messages: Vec<GenerationMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub stream: bool,
}

/// Full response from a non-streaming generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub content: String,
    pub model: String,
}

/// Errors from the generation pipeline.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("provider API error: {0}")]
    Api(String),

    #[error("stream error: {0}")]
    Stream(String),

    #[error("generation timed out after {0}s")]
    Timeout(u64),

    #[error("invalid generation request: {0}")]
    InvalidRequest(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_skips_absent_optionals() {
        let request = GenerationRequest {
            model: "gpt-4o".to_string(),
            messages: vec![GenerationMessage {
                role: TurnRole::User,
                content: "hi".to_string(),
            }],
            system: None,
            max_tokens: 1024,
            temperature: None,
            stream: false,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("system"));
        assert!(!json.contains("temperature"));
    }

    #[test]
    fn test_timeout_error_message() {
        let err = GenerationError::Timeout(60);
        assert_eq!(err.to_string(), "generation timed out after 60s");
    }
}
