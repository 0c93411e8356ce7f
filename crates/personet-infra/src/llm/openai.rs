//! OpenAI generation provider.
//!
//! Implements `GenerationProvider` from `personet-core` on top of
//! [`async_openai`] for type-safe request/response handling and built-in
//! SSE streaming. The per-variant model choice lives in configuration; a
//! single provider instance serves both.

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
};
use futures_util::StreamExt;
use secrecy::{ExposeSecret, SecretString};

use personet_core::generation::provider::{FragmentStream, GenerationProvider};
use personet_types::chat::TurnRole;
use personet_types::generation::{GenerationError, GenerationRequest, GenerationResponse};

/// OpenAI chat-completions provider.
///
/// # API Key Security
///
/// Does NOT derive Debug to prevent accidental exposure of the API key
/// stored inside the `async_openai::Client`.
pub struct OpenAiProvider {
    client: Client<OpenAIConfig>,
}

impl OpenAiProvider {
    /// Create a provider from an API key.
    pub fn new(api_key: SecretString) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key.expose_secret());
        Self {
            client: Client::with_config(config),
        }
    }

    /// Create a provider with a custom base URL (OpenAI-compatible endpoints).
    pub fn with_base_url(api_key: SecretString, base_url: &str) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key.expose_secret())
            .with_api_base(base_url);
        Self {
            client: Client::with_config(config),
        }
    }
}

/// Build a [`CreateChatCompletionRequest`] from a [`GenerationRequest`].
fn build_request(request: &GenerationRequest, stream: bool) -> CreateChatCompletionRequest {
    let mut messages: Vec<ChatCompletionRequestMessage> = Vec::new();

    if let Some(ref system) = request.system {
        messages.push(ChatCompletionRequestMessage::System(
            ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(system.clone()),
                name: None,
            },
        ));
    }

    for msg in &request.messages {
        let oai_msg = match msg.role {
            TurnRole::User => {
                ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                    content: ChatCompletionRequestUserMessageContent::Text(msg.content.clone()),
                    name: None,
                })
            }
            TurnRole::Assistant => {
                #[allow(deprecated)]
                ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                    content: Some(ChatCompletionRequestAssistantMessageContent::Text(
                        msg.content.clone(),
                    )),
                    refusal: None,
                    name: None,
                    audio: None,
                    tool_calls: None,
                    function_call: None,
                })
            }
        };
        messages.push(oai_msg);
    }

    let mut req = CreateChatCompletionRequest {
        model: request.model.clone(),
        messages,
        max_completion_tokens: Some(request.max_tokens),
        temperature: request.temperature.map(|t| t as f32),
        ..Default::default()
    };

    if stream {
        req.stream = Some(true);
    }

    req
}

impl GenerationProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        let oai_request = build_request(request, false);

        let response = self
            .client
            .chat()
            .create(oai_request)
            .await
            .map_err(map_openai_error)?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        Ok(GenerationResponse {
            content,
            model: response.model,
        })
    }

    fn stream(&self, request: GenerationRequest) -> FragmentStream {
        let oai_request = build_request(&request, true);

        // Clone the client for the 'static stream closure.
        let client = self.client.clone();

        Box::pin(async_stream::try_stream! {
            let mut oai_stream = client
                .chat()
                .create_stream(oai_request)
                .await
                .map_err(map_openai_error)?;

            while let Some(result) = oai_stream.next().await {
                let chunk = result.map_err(|e| GenerationError::Stream(e.to_string()))?;
                for choice in &chunk.choices {
                    if let Some(ref text) = choice.delta.content {
                        if !text.is_empty() {
                            yield text.clone();
                        }
                    }
                }
            }
        })
    }
}

/// Map an `async_openai::error::OpenAIError` to a [`GenerationError`].
fn map_openai_error(err: async_openai::error::OpenAIError) -> GenerationError {
    use async_openai::error::OpenAIError;

    match &err {
        OpenAIError::StreamError(stream_err) => GenerationError::Stream(stream_err.to_string()),
        OpenAIError::InvalidArgument(msg) => GenerationError::InvalidRequest(msg.clone()),
        OpenAIError::JSONDeserialize(_, content) => {
            GenerationError::Api(format!("failed to parse response: {content}"))
        }
        _ => GenerationError::Api(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use personet_types::generation::GenerationMessage;

    fn sample_request(system: Option<&str>) -> GenerationRequest {
        GenerationRequest {
            model: "gpt-4o".to_string(),
            messages: vec![
                GenerationMessage {
                    role: TurnRole::User,
                    content: "Hello".to_string(),
                },
                GenerationMessage {
                    role: TurnRole::Assistant,
                    content: "Hi there!".to_string(),
                },
            ],
            system: system.map(|s| s.to_string()),
            max_tokens: 1024,
            temperature: Some(0.7),
            stream: false,
        }
    }

    #[test]
    fn test_build_request_messages() {
        let oai_req = build_request(&sample_request(Some("Be helpful")), false);
        assert_eq!(oai_req.model, "gpt-4o");
        // 1 system + 2 conversation = 3 messages
        assert_eq!(oai_req.messages.len(), 3);
        assert_eq!(oai_req.max_completion_tokens, Some(1024));
        assert_eq!(oai_req.temperature, Some(0.7));
        assert!(oai_req.stream.is_none());
    }

    #[test]
    fn test_build_request_without_system() {
        let oai_req = build_request(&sample_request(None), false);
        assert_eq!(oai_req.messages.len(), 2);
        assert!(matches!(
            oai_req.messages[0],
            ChatCompletionRequestMessage::User(_)
        ));
    }

    #[test]
    fn test_build_request_streaming() {
        let oai_req = build_request(&sample_request(None), true);
        assert_eq!(oai_req.stream, Some(true));
    }

    #[test]
    fn test_map_openai_error_invalid_argument() {
        use async_openai::error::OpenAIError;
        let err = map_openai_error(OpenAIError::InvalidArgument("bad arg".to_string()));
        assert!(matches!(err, GenerationError::InvalidRequest(_)));
    }

    #[test]
    fn test_provider_name() {
        let provider = OpenAiProvider::new(SecretString::from("sk-test"));
        assert_eq!(provider.name(), "openai");
    }
}
