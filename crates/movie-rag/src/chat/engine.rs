//! Chat Engine - the response orchestrator.
//!
//! Runs classification, extraction and retrieval, then asks the text
//! generator for an answer grounded in the retrieved movies. Retrieved data
//! is always returned; the generated message is best-effort and falls back
//! to a deterministic template when the generator fails, times out, or is
//! not configured.

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::fallback::{clarifying_message, degraded_message};
use super::{ChatEnvelope, DegradationReason, HealthReport, SynthesisState};
use crate::config::MovieRagConfig;
use crate::error::EngineError;
use crate::llm::{build_grounded_prompt, GeneratorHealth, HttpTextGenerator, TextGenerator};
use crate::rag::query::truncate_chars;
use crate::rag::{Intent, ParsedQuery, QueryAnalyzer, RetrievalOutcome, RetrievalPlanner, RetrievalStatus};
use crate::storage::{MovieStore, SqliteMovieStore};
use crate::types::Movie;

pub struct ChatEngine {
    config: MovieRagConfig,
    analyzer: QueryAnalyzer,
    store: Arc<dyn MovieStore>,
    generator: Option<Arc<dyn TextGenerator>>,
    synthesis_timeout: Duration,
}

impl ChatEngine {
    pub fn new(
        config: MovieRagConfig,
        store: Arc<dyn MovieStore>,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        let analyzer = QueryAnalyzer::new(&config);
        let synthesis_timeout = config.generator.timeout();
        Self {
            config,
            analyzer,
            store,
            generator,
            synthesis_timeout,
        }
    }

    /// Open the SQLite catalogue and, when enabled, the HTTP generator.
    pub fn from_config(config: MovieRagConfig) -> anyhow::Result<Self> {
        config.validate().map_err(|e| anyhow::anyhow!("invalid config: {}", e))?;
        let store: Arc<dyn MovieStore> = Arc::new(SqliteMovieStore::open(&config.database)?);
        let generator: Option<Arc<dyn TextGenerator>> = if config.generator.enabled {
            Some(Arc::new(HttpTextGenerator::new(&config.generator)?))
        } else {
            tracing::info!("Text generation disabled; answers will use templates");
            None
        };
        Ok(Self::new(config, store, generator))
    }

    /// Override the synthesis timeout taken from the generator config.
    pub fn with_synthesis_timeout(mut self, timeout: Duration) -> Self {
        self.synthesis_timeout = timeout;
        self
    }

    pub fn config(&self) -> &MovieRagConfig {
        &self.config
    }

    pub fn analyze(&self, message: &str) -> ParsedQuery {
        self.analyzer.analyze(message)
    }

    /// Answer one message.
    ///
    /// Only a store failure is an error. Missing parameters produce a
    /// clarifying message and generator problems produce a template, both
    /// inside a normal envelope.
    pub async fn handle(&self, message: &str) -> Result<ChatEnvelope, EngineError> {
        let start = Instant::now();

        // 1. Classify and extract
        let query = self.analyzer.analyze(message);

        // 2. Retrieve
        let planner = RetrievalPlanner::new(self.store.as_ref(), &self.config.retrieval);
        let RetrievalOutcome { movies, status, .. } = planner.plan_and_execute(&query).map_err(|e| {
            tracing::error!(intent = %query.intent, error = %e, "Movie store query failed");
            EngineError::from(e)
        })?;

        // 3. Synthesize
        let (text, synthesis) = match status {
            RetrievalStatus::InsufficientParameters { reason } => {
                (clarifying_message(query.intent, &reason), SynthesisState::Skipped)
            }
            RetrievalStatus::Complete | RetrievalStatus::NoRetrieval => {
                match self.synthesize(message, query.intent, &movies).await {
                    Ok(text) => (text, SynthesisState::Available),
                    Err(reason) => (
                        degraded_message(query.intent, &movies),
                        SynthesisState::Degraded(reason),
                    ),
                }
            }
        };

        tracing::info!(
            intent = %query.intent,
            results = movies.len(),
            synthesis = ?synthesis,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Chat request handled"
        );

        Ok(ChatEnvelope {
            message: text,
            intent: query.intent,
            params: query,
            movies,
            synthesis,
        })
    }

    async fn synthesize(
        &self,
        message: &str,
        intent: Intent,
        movies: &[Movie],
    ) -> Result<String, DegradationReason> {
        let Some(generator) = &self.generator else {
            return Err(DegradationReason::Disabled);
        };

        let question = truncate_chars(message, self.config.query.max_input_chars);
        let prompt = build_grounded_prompt(question, movies);
        tracing::debug!(%intent, prompt_len = prompt.len(), movies = movies.len(), "Requesting synthesis");

        // The outer timeout is the hard bound; dropping the future on expiry
        // cancels the in-flight request and releases its connection.
        let timeout = self.synthesis_timeout;
        match tokio::time::timeout(timeout, generator.generate(&prompt, timeout)).await {
            Ok(Ok(text)) if !text.trim().is_empty() => Ok(text.trim().to_string()),
            Ok(Ok(_)) => {
                tracing::warn!(%intent, "Generator returned empty text, falling back to template");
                Err(DegradationReason::EmptyOutput)
            }
            Ok(Err(e)) => {
                tracing::warn!(%intent, error = %e, "Generation failed, falling back to template");
                Err(DegradationReason::Error)
            }
            Err(_) => {
                tracing::warn!(%intent, timeout_ms = timeout.as_millis() as u64, "Generation timed out, falling back to template");
                Err(DegradationReason::Timeout)
            }
        }
    }

    /// Store reachability plus generator reachability and model status.
    pub async fn health(&self) -> HealthReport {
        let database = self.store.health_check();
        let generator = match &self.generator {
            Some(generator) => generator.health_check().await,
            None => GeneratorHealth::unreachable(
                self.config.generator.model.clone(),
                "text generation is disabled",
            ),
        };
        HealthReport::new(database, generator)
    }
}

// ============================================================================
// Tests
// ============================================================================
