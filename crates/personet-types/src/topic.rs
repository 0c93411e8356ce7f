//! Topic documents and ordinal-based topic selection.
//!
//! Each user has, per persona variant, an ordered topic list with a parallel
//! list of descriptions. The session ordinal (1-based) selects one entry;
//! out-of-range ordinals fall back to the freeform sentinel topic.

use serde::{Deserialize, Serialize};

/// Fallback topic when the session ordinal has no entry in the topic list.
///
/// The freeform topic never carries a description.
pub const FREEFORM_TOPIC: &str = "Free Topic";

/// A user's ordered topic list for one persona variant.
///
/// `descriptions` is parallel to `topics`; a missing entry means the topic
/// has no description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicDocument {
    pub topics: Vec<String>,
    pub descriptions: Vec<String>,
}

/// The topic a session is anchored to, as resolved from an ordinal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicSelection {
    pub topic: String,
    pub description: Option<String>,
}

impl TopicSelection {
    /// The freeform fallback selection.
    pub fn freeform() -> Self {
        Self {
            topic: FREEFORM_TOPIC.to_string(),
            description: None,
        }
    }

    /// Render the topic line for prompts and logs:
    /// `"<topic>: <description>"` when a description is present, the bare
    /// topic otherwise.
    pub fn render(&self) -> String {
        match &self.description {
            Some(desc) => format!("{}: {desc}", self.topic),
            None => self.topic.clone(),
        }
    }
}

impl TopicDocument {
    /// Select the topic for a 1-based session ordinal.
    ///
    /// In-range ordinals pick `topics[ordinal-1]` and its parallel
    /// description. Out-of-range ordinals yield the freeform sentinel with
    /// no description. A topic equal to the freeform sentinel also gets no
    /// description, even when one is listed.
    pub fn select(&self, ordinal: u32) -> TopicSelection {
        // Ordinal 0 is rejected at session-key parse, but treat it as
        // out-of-range here rather than underflow.
        let Some(index) = ordinal.checked_sub(1).map(|i| i as usize) else {
            return TopicSelection::freeform();
        };
        let Some(topic) = self.topics.get(index) else {
            return TopicSelection::freeform();
        };
        if topic == FREEFORM_TOPIC {
            return TopicSelection {
                topic: topic.clone(),
                description: None,
            };
        }
        TopicSelection {
            topic: topic.clone(),
            description: self.descriptions.get(index).cloned(),
        }
    }
}
