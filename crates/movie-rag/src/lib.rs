pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod rag;
pub mod storage;
pub mod types;

// Re-export primary types for convenience
pub use chat::{ChatEngine, ChatEnvelope, ChatRequest, HealthReport, HealthStatus, SynthesisState};
pub use config::MovieRagConfig;
pub use error::{EngineError, StoreError, StoreResult};
pub use rag::{Intent, ParsedQuery, QueryAnalyzer, RetrievalPlan, RetrievalPlanner, SortHint};
pub use storage::{MovieFilters, MovieStore, SortKey, SqliteMovieStore};
pub use types::{CastMember, Movie, UserRatingStats};

// Re-export LLM types
pub use llm::{
    ApiProvider, GenerationConfig, GenerationPrompt, GeneratorHealth, HttpTextGenerator,
    ProviderInfo, TextGenerator,
};
