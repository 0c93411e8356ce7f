//! GenerationProvider trait definition.
//!
//! The opaque capability boundary to the text-generation service. Uses
//! RPITIT for `complete` and `Pin<Box<dyn Stream>>` for `stream` (streams
//! need to be object-safe for the BoxGenerationProvider wrapper).

use std::pin::Pin;

use futures_util::Stream;

use personet_types::generation::{GenerationError, GenerationRequest, GenerationResponse};

/// A stream of response text fragments. Concatenating all fragments yields
/// the full response text.
pub type FragmentStream =
    Pin<Box<dyn Stream<Item = Result<String, GenerationError>> + Send + 'static>>;

/// Trait for generation provider backends (OpenAI-compatible APIs).
///
/// Implementations live in personet-infra (e.g., `OpenAiProvider`).
pub trait GenerationProvider: Send + Sync {
    /// Human-readable provider name (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a generation request and receive the full response.
    fn complete(
        &self,
        request: &GenerationRequest,
    ) -> impl std::future::Future<Output = Result<GenerationResponse, GenerationError>> + Send;

    /// Send a streaming generation request. Returns a finite, single-use
    /// sequence of text fragments produced at the provider's own pace.
    fn stream(&self, request: GenerationRequest) -> FragmentStream;
}
