//! Chat service: the orchestrator for blocking and streaming turns.
//!
//! Coordinates the session registry (build-once initialization), the
//! per-variant topic refresh policy, history mutation, generation, and
//! transcript persistence. Generic over the persona/topic/transcript ports
//! to keep this crate free of infrastructure dependencies.

use std::pin::Pin;
use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use tracing::{info, warn};

use personet_types::chat::{Transcript, Turn};
use personet_types::config::GlobalConfig;
use personet_types::error::ChatError;
use personet_types::persona::PersonaVariant;
use personet_types::session::SessionKey;
use personet_types::topic::{TopicDocument, TopicSelection};

use crate::generation::box_provider::BoxGenerationProvider;
use crate::prompt::PromptBuilder;
use crate::repository::{PersonaSource, TopicStore, TranscriptStore};
use crate::session::{SessionContext, SessionRegistry, SessionSlot, SlotKey};

use super::engine::ChatEngine;
use super::policy::TopicRefresh;

/// Lazy, finite, single-use sequence of response text fragments. Not
/// restartable: once consumed, a new call is required for another turn.
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<String, ChatError>> + Send + 'static>>;

/// Orchestrates persona chat sessions across both call paths.
pub struct ChatService<P: PersonaSource, T: TopicStore, S: TranscriptStore> {
    personas: P,
    topics: T,
    // Arc so the streaming path can commit after `self` is out of scope.
    transcripts: Arc<S>,
    provider: Arc<BoxGenerationProvider>,
    registry: SessionRegistry,
    config: GlobalConfig,
}

impl<P, T, S> ChatService<P, T, S>
where
    P: PersonaSource + 'static,
    T: TopicStore + 'static,
    S: TranscriptStore + 'static,
{
    /// Create a service over the given ports and provider.
    pub fn new(
        personas: P,
        topics: T,
        transcripts: S,
        provider: BoxGenerationProvider,
        config: GlobalConfig,
    ) -> Self {
        let registry = SessionRegistry::new(config.registry.capacity);
        Self {
            personas,
            topics,
            transcripts: Arc::new(transcripts),
            provider: Arc::new(provider),
            registry,
            config,
        }
    }

    /// The session registry (exposed for introspection).
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Blocking turn: returns the full response text.
    ///
    /// Generation failure aborts before any history mutation -- no partial
    /// commit. Persistence failure is logged and does not invalidate the
    /// returned response.
    pub async fn chat(
        &self,
        user_id: &str,
        input: &str,
        session_id: &str,
        variant: PersonaVariant,
    ) -> Result<String, ChatError> {
        let key: SessionKey = session_id.parse()?;
        info!(user_id, session = %key, variant = %variant, "Chat turn started");

        let slot = self.registry.slot(SlotKey {
            variant,
            session: key.clone(),
        });
        let context = slot
            .ready(|| self.initialize(user_id, variant, &key))
            .await?;

        if TopicRefresh::for_variant(variant).refreshes_blocking() {
            let selection = self.resolve_topic(user_id, variant, key.ordinal()).await?;
            slot.refresh_topic(selection).await;
        }

        // Generation runs against a snapshot, without the per-session lock.
        let snapshot = slot.history_snapshot().await;
        let response = context.engine.complete(input, &snapshot).await?;

        Self::commit_turn(&self.transcripts, user_id, &key, variant, &slot, input, &response)
            .await;

        Ok(response)
    }

    /// Streaming turn: yields response fragments at the provider's pace.
    ///
    /// On normal completion the concatenation of all fragments is committed
    /// as a single assistant turn (after the user turn) and persisted.
    /// Dropping the stream before exhaustion commits nothing; mid-stream
    /// provider errors propagate and leave history unmodified.
    pub async fn chat_stream(
        &self,
        user_id: &str,
        input: &str,
        session_id: &str,
        variant: PersonaVariant,
    ) -> Result<ChatStream, ChatError> {
        let key: SessionKey = session_id.parse()?;
        info!(user_id, session = %key, variant = %variant, "Streaming chat turn started");

        let slot = self.registry.slot(SlotKey {
            variant,
            session: key.clone(),
        });
        let context = slot
            .ready(|| self.initialize(user_id, variant, &key))
            .await?;

        if TopicRefresh::for_variant(variant).refreshes_streaming() {
            let selection = self.resolve_topic(user_id, variant, key.ordinal()).await?;
            slot.refresh_topic(selection).await;
        }

        let snapshot = slot.history_snapshot().await;
        let engine = Arc::clone(&context.engine);
        let transcripts = Arc::clone(&self.transcripts);
        let user_id = user_id.to_string();
        let input = input.to_string();

        let stream = async_stream::try_stream! {
            let mut fragments = engine.stream(&input, &snapshot);
            let mut full = String::new();

            while let Some(fragment) = fragments.next().await {
                let text = fragment.map_err(ChatError::Generation)?;
                full.push_str(&text);
                yield text;
            }

            // Reached only when the consumer drains the whole stream --
            // early termination skips the commit entirely.
            Self::commit_turn(&transcripts, &user_id, &key, variant, &slot, &input, &full)
                .await;
        };

        Ok(Box::pin(stream))
    }

    // --- Topic administration (consumed by the transport layer) ---

    /// Store or replace a user's selected topics for a variant.
    pub async fn update_topics(
        &self,
        user_id: &str,
        variant: PersonaVariant,
        document: &TopicDocument,
    ) -> Result<(), ChatError> {
        self.topics.upsert(user_id, variant, document).await?;
        info!(user_id, variant = %variant, count = document.topics.len(), "Topics updated");
        Ok(())
    }

    /// Fetch a user's topic document.
    pub async fn topics(
        &self,
        user_id: &str,
        variant: PersonaVariant,
    ) -> Result<Option<TopicDocument>, ChatError> {
        Ok(self.topics.fetch(user_id, variant).await?)
    }

    /// Read back a persisted transcript.
    pub async fn transcript(
        &self,
        user_id: &str,
        variant: PersonaVariant,
        ordinal: u32,
    ) -> Result<Option<Transcript>, ChatError> {
        Ok(self.transcripts.fetch(user_id, variant, ordinal).await?)
    }

    // --- Internals ---

    /// First-access initialization: persona load, topic resolution, prompt
    /// build, engine bind. Runs at most once per slot via
    /// [`SessionSlot::ready`]; any error here leaves no partial record.
    async fn initialize(
        &self,
        user_id: &str,
        variant: PersonaVariant,
        key: &SessionKey,
    ) -> Result<SessionContext, ChatError> {
        let document = self
            .personas
            .load(user_id, variant)
            .await?
            .ok_or_else(|| ChatError::PersonaNotFound {
                user_id: user_id.to_string(),
            })?;
        let persona = document.render();

        let selection = self.resolve_topic(user_id, variant, key.ordinal()).await?;
        info!(
            user_id,
            session = %key,
            topic = %selection.render(),
            "Session initialized"
        );

        let template = PromptBuilder::build(&persona, &selection, variant);
        let engine = Arc::new(ChatEngine::new(
            Arc::clone(&self.provider),
            template,
            self.config.variants.get(variant),
            &self.config.generation,
        ));

        Ok(SessionContext {
            persona,
            topic_at_build: selection,
            engine,
        })
    }

    /// Resolve the topic for a session ordinal from the user's document.
    async fn resolve_topic(
        &self,
        user_id: &str,
        variant: PersonaVariant,
        ordinal: u32,
    ) -> Result<TopicSelection, ChatError> {
        let document = self
            .topics
            .fetch(user_id, variant)
            .await?
            .ok_or_else(|| ChatError::TopicDataNotFound {
                user_id: user_id.to_string(),
            })?;
        Ok(document.select(ordinal))
    }

    /// Append the user/assistant turn pair and persist the full transcript,
    /// all under the per-session lock so concurrent calls cannot interleave
    /// their pairs.
    async fn commit_turn(
        transcripts: &S,
        user_id: &str,
        key: &SessionKey,
        variant: PersonaVariant,
        slot: &SessionSlot,
        input: &str,
        response: &str,
    ) {
        let mut state = slot.turn_state().await;
        state.history.append(Turn::user(input));
        state.history.append(Turn::assistant(response));

        let topic = state
            .topic
            .as_ref()
            .map(|selection| selection.topic.clone())
            .unwrap_or_else(|| personet_types::topic::FREEFORM_TOPIC.to_string());
        let transcript = Transcript {
            session_id: key.to_string(),
            variant,
            topic,
            turns: state.history.snapshot(),
        };

        // Persistence failure does not roll back the returned response;
        // this is the one place user-visible success and durable state can
        // diverge.
        if let Err(err) = transcripts.persist(user_id, key.ordinal(), &transcript).await {
            warn!(
                user_id,
                session = %key,
                error = %err,
                "Transcript persistence failed after response was produced"
            );
        }
    }
}
