//! Global tracing setup for the personet server.
//!
//! One fmt layer for human-readable structured logs, filtered by `RUST_LOG`
//! (default `info`). With `--otel`, spans are additionally bridged to
//! OpenTelemetry and exported to stdout, which is enough to inspect the
//! `gen_ai.*` generation spans locally without an OTLP collector.

use std::sync::OnceLock;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing::Subscriber;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt::format::FmtSpan};

/// Provider handle kept for the flush on shutdown.
static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// Install the process-wide subscriber.
///
/// Fails if a global subscriber is already set, so call it once at startup
/// before anything logs.
pub fn init_tracing(enable_otel: bool) -> Result<(), Box<dyn std::error::Error>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE);

    let registry = tracing_subscriber::registry().with(filter).with(fmt_layer);

    if enable_otel {
        registry.with(otel_layer()).try_init()?;
    } else {
        registry.try_init()?;
    }

    Ok(())
}

/// Build the tracing-to-OpenTelemetry bridge layer over a stdout exporter,
/// registering the provider globally and stashing it for shutdown.
fn otel_layer<S>() -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let provider = SdkTracerProvider::builder()
        .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
        .build();
    let tracer = provider.tracer("personet");

    let _ = TRACER_PROVIDER.set(provider.clone());
    opentelemetry::global::set_tracer_provider(provider);

    tracing_opentelemetry::layer().with_tracer(tracer)
}

/// Flush buffered spans before exit. No-op when OTel export was never
/// enabled.
pub fn shutdown_tracing() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            tracing::warn!(error = %e, "tracer provider shutdown failed");
        }
    }
}
