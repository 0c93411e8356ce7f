//! BoxGenerationProvider -- object-safe dynamic dispatch wrapper for
//! GenerationProvider.
//!
//! 1. Define an object-safe `GenerationProviderDyn` trait with boxed futures
//! 2. Blanket-impl `GenerationProviderDyn` for all `T: GenerationProvider`
//! 3. `BoxGenerationProvider` wraps `Box<dyn GenerationProviderDyn>` and
//!    delegates

use std::future::Future;
use std::pin::Pin;

use personet_types::generation::{GenerationError, GenerationRequest, GenerationResponse};

use super::provider::{FragmentStream, GenerationProvider};

/// Object-safe version of [`GenerationProvider`] with boxed futures.
///
/// Exists solely to enable dynamic dispatch; a blanket implementation covers
/// all types implementing `GenerationProvider`.
pub trait GenerationProviderDyn: Send + Sync {
    fn name(&self) -> &str;

    fn complete_boxed<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> Pin<Box<dyn Future<Output = Result<GenerationResponse, GenerationError>> + Send + 'a>>;

    fn stream_boxed(&self, request: GenerationRequest) -> FragmentStream;
}

/// Blanket implementation: any `GenerationProvider` automatically implements
/// `GenerationProviderDyn`.
impl<T: GenerationProvider> GenerationProviderDyn for T {
    fn name(&self) -> &str {
        GenerationProvider::name(self)
    }

    fn complete_boxed<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> Pin<Box<dyn Future<Output = Result<GenerationResponse, GenerationError>> + Send + 'a>>
    {
        Box::pin(self.complete(request))
    }

    fn stream_boxed(&self, request: GenerationRequest) -> FragmentStream {
        self.stream(request)
    }
}

/// Type-erased generation provider.
///
/// Since `GenerationProvider` uses RPITIT it cannot be used as a trait
/// object directly; `BoxGenerationProvider` provides equivalent methods that
/// delegate to the inner `GenerationProviderDyn` trait object.
pub struct BoxGenerationProvider {
    inner: Box<dyn GenerationProviderDyn + Send + Sync>,
}

impl BoxGenerationProvider {
    /// Wrap a concrete `GenerationProvider` in a type-erased box.
    pub fn new<T: GenerationProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }

    /// Human-readable provider name.
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Send a generation request and receive the full response.
    pub async fn complete(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        self.inner.complete_boxed(request).await
    }

    /// Send a streaming generation request.
    pub fn stream(&self, request: GenerationRequest) -> FragmentStream {
        self.inner.stream_boxed(request)
    }
}
