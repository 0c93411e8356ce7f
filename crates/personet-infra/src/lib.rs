//! Infrastructure implementations for Personet.
//!
//! Concrete backends for the ports defined in `personet-core`: SQLite
//! storage for topics and transcripts, filesystem persona documents, the
//! OpenAI generation provider, and configuration loading.

pub mod config;
pub mod filesystem;
pub mod llm;
pub mod sqlite;
