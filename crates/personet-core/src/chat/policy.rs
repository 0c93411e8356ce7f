//! Per-variant topic refresh policy.
//!
//! The two persona variants disagree on when topic data is re-resolved
//! mid-session, and neither rebuilds the prompt template when the topic
//! changes -- the template stays bound to the build-time topic while the
//! refreshed topic feeds persisted transcripts. Both behaviors are kept
//! behind this explicit policy rather than unified.

use personet_types::persona::PersonaVariant;

/// Which call path re-resolves topic data on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicRefresh {
    /// Re-resolve on every blocking `chat` call (tag variant).
    OnBlocking,
    /// Re-resolve on every streaming `chat_stream` call (episodic variant).
    OnStreaming,
}

impl TopicRefresh {
    /// The refresh policy a persona variant carries.
    pub fn for_variant(variant: PersonaVariant) -> Self {
        match variant {
            PersonaVariant::Tag => TopicRefresh::OnBlocking,
            PersonaVariant::Episodic => TopicRefresh::OnStreaming,
        }
    }

    /// Whether a blocking call should re-resolve topic data.
    pub fn refreshes_blocking(self) -> bool {
        self == TopicRefresh::OnBlocking
    }

    /// Whether a streaming call should re-resolve topic data.
    pub fn refreshes_streaming(self) -> bool {
        self == TopicRefresh::OnStreaming
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_refreshes_on_blocking_only() {
        let policy = TopicRefresh::for_variant(PersonaVariant::Tag);
        assert!(policy.refreshes_blocking());
        assert!(!policy.refreshes_streaming());
    }

    #[test]
    fn test_episodic_refreshes_on_streaming_only() {
        let policy = TopicRefresh::for_variant(PersonaVariant::Episodic);
        assert!(!policy.refreshes_blocking());
        assert!(policy.refreshes_streaming());
    }
}
