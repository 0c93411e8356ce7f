//! Chat engine: a generation provider bound to one session's prompt
//! template and model parameters.
//!
//! Built once per session and immutable thereafter. Replays the history
//! snapshot plus the new input against the bound system prompt, with an
//! overall deadline on blocking calls and an idle (between-fragment)
//! deadline on streaming calls.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tracing::{Instrument, info_span};

use personet_types::chat::Turn;
use personet_types::config::{GenerationConfig, VariantConfig};
use personet_types::generation::{GenerationError, GenerationMessage, GenerationRequest};

use crate::generation::box_provider::BoxGenerationProvider;
use crate::generation::provider::FragmentStream;
use crate::prompt::PromptTemplate;

/// Generation pipeline bound to an immutable prompt template.
pub struct ChatEngine {
    provider: Arc<BoxGenerationProvider>,
    template: PromptTemplate,
    model: String,
    temperature: f64,
    max_tokens: u32,
    timeout: Duration,
    idle_timeout: Duration,
}

impl ChatEngine {
    /// Bind a provider to a prompt template with the variant's fixed model
    /// parameters.
    pub fn new(
        provider: Arc<BoxGenerationProvider>,
        template: PromptTemplate,
        variant_config: &VariantConfig,
        generation: &GenerationConfig,
    ) -> Self {
        Self {
            provider,
            template,
            model: variant_config.model.clone(),
            temperature: variant_config.temperature,
            max_tokens: generation.max_tokens,
            timeout: Duration::from_secs(generation.timeout_secs),
            idle_timeout: Duration::from_secs(generation.stream_idle_timeout_secs),
        }
    }

    /// The bound system prompt template.
    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    /// The model this engine is bound to.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Blocking turn: full response text, subject to the overall deadline.
    pub async fn complete(
        &self,
        input: &str,
        history: &[Turn],
    ) -> Result<String, GenerationError> {
        let request = self.build_request(input, history, false);

        let span = info_span!(
            "gen_ai.complete",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.request.temperature = ?request.temperature,
            gen_ai.request.stream = false,
        );

        let response = tokio::time::timeout(self.timeout, self.provider.complete(&request))
            .instrument(span)
            .await
            .map_err(|_| GenerationError::Timeout(self.timeout.as_secs()))??;

        Ok(response.content)
    }

    /// Streaming turn: a finite, single-use fragment stream produced at the
    /// provider's pace. A gap longer than the idle deadline between
    /// fragments ends the stream with a timeout error.
    pub fn stream(&self, input: &str, history: &[Turn]) -> FragmentStream {
        let request = self.build_request(input, history, true);

        let span = info_span!(
            "gen_ai.stream",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.request.temperature = ?request.temperature,
            gen_ai.request.stream = true,
        );

        let inner = self.provider.stream(request);
        let idle = self.idle_timeout;

        let guarded: FragmentStream = Box::pin(async_stream::try_stream! {
            let mut inner = inner;
            loop {
                match tokio::time::timeout(idle, inner.next()).await {
                    Ok(Some(fragment)) => {
                        let text = fragment?;
                        yield text;
                    }
                    Ok(None) => break,
                    Err(_) => {
                        Err(GenerationError::Timeout(idle.as_secs()))?;
                    }
                }
            }
        });

        // Keep the span alive for the whole streaming duration.
        Box::pin(StreamInSpan {
            inner: guarded,
            span,
        })
    }

    /// Assemble the request: bound system prompt, replayed history in
    /// chronological order, then the new input as the final user message.
    fn build_request(&self, input: &str, history: &[Turn], stream: bool) -> GenerationRequest {
        let mut messages: Vec<GenerationMessage> = history
            .iter()
            .map(|turn| GenerationMessage {
                role: turn.role,
                content: turn.content.clone(),
            })
            .collect();

        messages.push(GenerationMessage {
            role: personet_types::chat::TurnRole::User,
            content: input.to_string(),
        });

        GenerationRequest {
            model: self.model.clone(),
            messages,
            system: Some(self.template.system().to_string()),
            max_tokens: self.max_tokens,
            temperature: Some(self.temperature),
            stream,
        }
    }
}

/// A stream wrapper that enters a tracing span on every poll.
///
/// Dropping the span right after building the stream would lose the
/// instrumentation for the actual streaming duration, so the span lives
/// alongside the fragment stream and is entered per poll.
struct StreamInSpan {
    inner: FragmentStream,
    span: tracing::Span,
}

impl futures_util::Stream for StreamInSpan {
    type Item = Result<String, GenerationError>;

    fn poll_next(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        // FragmentStream and Span are both Unpin, so the projection is safe.
        let this = self.get_mut();
        let _enter = this.span.enter();
        this.inner.as_mut().poll_next(cx)
    }
}
