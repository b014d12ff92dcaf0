//! LLM Module - generative-text capability used for answer synthesis.
//!
//! The engine depends only on the `TextGenerator` trait. Every call carries
//! an explicit timeout, and failures are plain `anyhow` errors that the
//! caller is expected to recover from.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod http_provider;
pub mod prompt;

pub use http_provider::HttpTextGenerator;
pub use prompt::{build_grounded_prompt, GenerationPrompt, SYSTEM_PROMPT};

use crate::config::GeneratorConfig;

/// Wire protocol spoken by the generator endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiProvider {
    /// Ollama native API (`/api/generate`, `/api/tags`).
    Ollama,
    /// Any server exposing `/v1/chat/completions` and `/v1/models`.
    OpenAICompatible,
}

impl ApiProvider {
    pub fn name(&self) -> &'static str {
        match self {
            ApiProvider::Ollama => "Ollama",
            ApiProvider::OpenAICompatible => "OpenAI-compatible",
        }
    }
}

/// Sampling settings sent with every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub max_tokens: usize,
    pub temperature: f32,
}

impl From<&GeneratorConfig> for GenerationConfig {
    fn from(config: &GeneratorConfig) -> Self {
        Self {
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_tokens: 512,
            temperature: 0.7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub name: String,
    pub model: String,
    pub endpoint: String,
}

/// Reachability of the generator and whether the configured model is served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorHealth {
    pub reachable: bool,
    pub model_loaded: bool,
    pub model: String,
    #[serde(default)]
    pub available_models: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GeneratorHealth {
    pub fn unreachable(model: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            reachable: false,
            model_loaded: false,
            model: model.into(),
            available_models: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// Generative-text capability.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion, giving up after `timeout`.
    async fn generate(&self, prompt: &GenerationPrompt, timeout: Duration) -> Result<String>;

    /// Check the endpoint. Never fails; problems are reported in the result.
    async fn health_check(&self) -> GeneratorHealth;

    fn info(&self) -> ProviderInfo;
}
