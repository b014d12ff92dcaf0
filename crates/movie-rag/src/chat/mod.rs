pub mod engine;
pub mod fallback;

pub use engine::ChatEngine;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::llm::GeneratorHealth;
use crate::rag::{Intent, ParsedQuery};
use crate::types::Movie;

/// Request size accepted by `ChatRequest::validate`.
pub const MAX_MESSAGE_CHARS: usize = 1000;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Transport-level check: 1 to 1000 characters.
    pub fn validate(&self) -> Result<(), EngineError> {
        let chars = self.message.chars().count();
        if chars == 0 {
            return Err(EngineError::InvalidRequest {
                reason: "message must not be empty".to_string(),
            });
        }
        if chars > MAX_MESSAGE_CHARS {
            return Err(EngineError::InvalidRequest {
                reason: format!(
                    "message is {} characters, the maximum is {}",
                    chars, MAX_MESSAGE_CHARS
                ),
            });
        }
        Ok(())
    }
}

/// How the envelope's `message` was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisState {
    /// Generated by the text generator from the retrieved movies.
    Available,
    /// The generator failed for this request; `message` is a template.
    Degraded(DegradationReason),
    /// The query needed clarification, so no generation was attempted.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradationReason {
    Timeout,
    Error,
    EmptyOutput,
    /// No generator is configured.
    Disabled,
}

impl DegradationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DegradationReason::Timeout => "timeout",
            DegradationReason::Error => "error",
            DegradationReason::EmptyOutput => "empty_output",
            DegradationReason::Disabled => "disabled",
        }
    }
}

/// The response handed to the transport layer.
///
/// `movies` and `params` always reflect what retrieval produced; only
/// `message` depends on whether synthesis succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEnvelope {
    pub message: String,
    pub intent: Intent,
    pub params: ParsedQuery,
    pub movies: Vec<Movie>,
    #[serde(skip, default = "default_synthesis")]
    pub synthesis: SynthesisState,
}

fn default_synthesis() -> SynthesisState {
    SynthesisState::Available
}

impl ChatEnvelope {
    pub fn is_degraded(&self) -> bool {
        matches!(self.synthesis, SynthesisState::Degraded(_))
    }
}

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub database: bool,
    pub generator: GeneratorHealth,
}

impl HealthReport {
    /// Healthy only when the catalogue answers and the model is loaded.
    pub fn new(database: bool, generator: GeneratorHealth) -> Self {
        let status = if database && generator.reachable && generator.model_loaded {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        };
        Self {
            status,
            database,
            generator,
        }
    }
}
