//! Observability support for Personet.

pub mod tracing_setup;
