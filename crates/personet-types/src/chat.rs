//! Conversation turn and transcript types for Personet.
//!
//! A `Turn` is one message in a conversation; a `Transcript` is the durably
//! persisted full history of a session at the time of the last persist call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::persona::PersonaVariant;

/// Role of a turn in a conversation.
///
/// Stored directly on `Turn` as an explicit tagged variant -- roles are
/// never inferred from the shape of the message object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::User => write!(f, "user"),
            TurnRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for TurnRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(TurnRole::User),
            "assistant" => Ok(TurnRole::Assistant),
            other => Err(format!("invalid turn role: '{other}'")),
        }
    }
}

/// One message in a conversation.
///
/// Turns are ordered by insertion; that chronological order is the only
/// order ever replayed to the generation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub id: Uuid,
    pub role: TurnRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a user turn stamped with the current time.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            role: TurnRole::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create an assistant turn stamped with the current time.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            role: TurnRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Observable lifecycle phase of a session cache entry.
///
/// A record advances Uninitialized -> Initializing -> Ready during the first
/// call against its session id. A failed initialization returns the record
/// to Uninitialized -- no partially built record is ever observable as Ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Uninitialized,
    Initializing,
    Ready,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Uninitialized => write!(f, "uninitialized"),
            SessionState::Initializing => write!(f, "initializing"),
            SessionState::Ready => write!(f, "ready"),
        }
    }
}

/// Durable record of a session's full conversation history.
///
/// Keyed by `(user_id, variant, ordinal)` in storage. Each persist call
/// overwrites the whole document, so persisting an unchanged session twice
/// yields identical stored state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub session_id: String,
    pub variant: PersonaVariant,
    pub topic: String,
    pub turns: Vec<Turn>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_role_roundtrip() {
        for role in [TurnRole::User, TurnRole::Assistant] {
            let s = role.to_string();
            let parsed: TurnRole = s.parse().unwrap();
            assert_eq!(role, parsed);
        }
    }

    #[test]
    fn test_turn_role_serde() {
        let json = serde_json::to_string(&TurnRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
        let parsed: TurnRole = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, TurnRole::Assistant);
    }

    #[test]
    fn test_turn_constructors() {
        let user = Turn::user("hi");
        assert_eq!(user.role, TurnRole::User);
        assert_eq!(user.content, "hi");

        let assistant = Turn::assistant("hello");
        assert_eq!(assistant.role, TurnRole::Assistant);
    }

    #[test]
    fn test_transcript_serialization_is_deterministic() {
        let transcript = Transcript {
            session_id: "s/1".to_string(),
            variant: PersonaVariant::Tag,
            topic: "Leadership".to_string(),
            turns: vec![Turn::user("hi"), Turn::assistant("hello")],
        };
        let a = serde_json::to_string(&transcript).unwrap();
        let b = serde_json::to_string(&transcript).unwrap();
        assert_eq!(a, b);
    }
}
