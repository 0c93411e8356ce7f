//! System prompt builder for persona sessions.
//!
//! Assembles the system prompt from a rendered persona, the session's
//! resolved topic, and a per-variant instruction block. The template is
//! immutable once built; the conversation history and the new input are
//! realized per request by the chat engine, in that order, after the system
//! prompt.

use personet_types::persona::{PersonaVariant, RenderedPersona};
use personet_types::topic::TopicSelection;

/// An immutable system prompt bound to the persona and topic captured at
/// build time.
///
/// Rebuilding with different topic values produces a distinct instance;
/// whether an existing session's template may be rebuilt is the caller's
/// decision (it never is -- see the topic refresh policy).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    system: String,
}

impl PromptTemplate {
    /// The full system prompt text.
    pub fn system(&self) -> &str {
        &self.system
    }
}

/// Builds a [`PromptTemplate`] from persona and topic blocks.
///
/// Layout (fixed order):
/// ```text
/// === User Persona (= Your Persona) ===
/// {persona description}
/// === Events the user may have experienced ===   (episodic only)
/// {experienceable episodes}
/// === Instructions ===
/// {behavioral rules, topic anchoring}
/// ```
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the system prompt. Pure: no side effects, deterministic for
    /// identical inputs.
    pub fn build(
        persona: &RenderedPersona,
        topic: &TopicSelection,
        variant: PersonaVariant,
    ) -> PromptTemplate {
        let mut sections = Vec::with_capacity(4);

        sections.push(
            "You are an agent with the following persona, which is identical to the user's persona."
                .to_string(),
        );

        sections.push(format!(
            "=== User Persona (= Your Persona) ===\n{}",
            persona.description.trim()
        ));

        // Experienceable-events block -- episodic variant only
        if variant == PersonaVariant::Episodic {
            if let Some(experienceable) = &persona.experienceable {
                sections.push(format!(
                    "=== Events the user may have experienced ===\n{}",
                    experienceable.trim()
                ));
            }
        }

        sections.push(format!(
            "=== Instructions ===\n\
             Understand and internalize this persona, then follow the rules below to engage in conversation with the user:\n\
             {}",
            Self::rules(topic, variant).join("\n")
        ));

        PromptTemplate {
            system: sections.join("\n\n"),
        }
    }

    /// The per-variant behavioral rule list.
    fn rules(topic: &TopicSelection, variant: PersonaVariant) -> Vec<String> {
        let mut rules = Vec::with_capacity(8);

        match variant {
            PersonaVariant::Tag => {
                rules.push(
                    "- You may mention personality traits, but only if they naturally fit the \
                     context of the conversation. Do not force them in when inappropriate."
                        .to_string(),
                );
                rules.push("- Do not talk about your own experiences.".to_string());
            }
            PersonaVariant::Episodic => {
                rules.push(
                    "- You may naturally incorporate fictional personal experiences that reflect \
                     this persona, as long as they fit the flow of the conversation."
                        .to_string(),
                );
                rules.push(
                    "- Do not explicitly mention the user's roles or original experiences."
                        .to_string(),
                );
                rules.push(
                    "- You may refer to personality traits or personal experiences, but only if \
                     they do not disrupt the conversation."
                        .to_string(),
                );
            }
        }

        rules.push(format!("- Lead a conversation around: << {} >>", topic.render()));
        rules.push("- Your responses MUST feel human-like and contextually grounded.".to_string());
        rules.push(
            "- Speak casually and use \"I\" when referring to yourself and \"you\" when \
             addressing the user."
                .to_string(),
        );
        rules.push("- Avoid honorifics or formal speech.".to_string());
        rules.push(
            "- You should continue the conversation with the user for at least 10 turns."
                .to_string(),
        );

        rules
    }
}
