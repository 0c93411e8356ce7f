//! Global configuration types for Personet.
//!
//! `GlobalConfig` represents the top-level `config.toml` that controls
//! generation timeouts, per-variant model choice, and registry bounds.

use serde::{Deserialize, Serialize};

use crate::persona::PersonaVariant;

/// Top-level configuration for the Personet server.
///
/// Loaded from `{data_dir}/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Override for the database URL. When absent, the server uses
    /// `sqlite://{data_dir}/personet.db`.
    #[serde(default)]
    pub database_url: Option<String>,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub variants: VariantModels,
}

fn default_bind_addr() -> String {
    "127.0.0.1:8000".to_string()
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            database_url: None,
            generation: GenerationConfig::default(),
            registry: RegistryConfig::default(),
            variants: VariantModels::default(),
        }
    }
}

/// Timeouts and response-size limits for generation calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Overall deadline for a blocking generation call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum idle gap between streamed fragments, in seconds.
    #[serde(default = "default_stream_idle_timeout_secs")]
    pub stream_idle_timeout_secs: u64,

    /// Maximum tokens per assistant response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_stream_idle_timeout_secs() -> u64 {
    30
}

fn default_max_tokens() -> u32 {
    1024
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            stream_idle_timeout_secs: default_stream_idle_timeout_secs(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Bounds on the in-process session registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Maximum number of cached session records before idle ones are
    /// evicted least-recently-used first. Evicted sessions rebuild from
    /// durable storage on next access.
    #[serde(default = "default_registry_capacity")]
    pub capacity: usize,
}

fn default_registry_capacity() -> usize {
    1024
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            capacity: default_registry_capacity(),
        }
    }
}

/// Model binding for one persona variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantConfig {
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

fn default_temperature() -> f64 {
    0.7
}

/// Per-variant model bindings. Model choice and temperature are fixed per
/// persona variant for the lifetime of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantModels {
    #[serde(default = "default_tag_config")]
    pub tag: VariantConfig,
    #[serde(default = "default_episodic_config")]
    pub episodic: VariantConfig,
}

fn default_tag_config() -> VariantConfig {
    VariantConfig {
        model: "gpt-3.5-turbo".to_string(),
        temperature: default_temperature(),
    }
}

fn default_episodic_config() -> VariantConfig {
    VariantConfig {
        model: "gpt-4o".to_string(),
        temperature: default_temperature(),
    }
}

impl Default for VariantModels {
    fn default() -> Self {
        Self {
            tag: default_tag_config(),
            episodic: default_episodic_config(),
        }
    }
}

impl VariantModels {
    /// Model binding for the given variant.
    pub fn get(&self, variant: PersonaVariant) -> &VariantConfig {
        match variant {
            PersonaVariant::Tag => &self.tag,
            PersonaVariant::Episodic => &self.episodic,
        }
    }
}
