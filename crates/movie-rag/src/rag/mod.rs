//! Query understanding and retrieval: intent classification, parameter
//! extraction, retrieval planning and grounding-context formatting.

pub mod analyzer;
pub mod context;
pub mod intent_classifier;
pub mod parameter_extractor;
pub mod query;
pub mod retrieval_planner;

pub use analyzer::QueryAnalyzer;
pub use context::format_movie_context;
pub use intent_classifier::IntentClassifier;
pub use parameter_extractor::{ParameterExtractor, KNOWN_GENRES};
pub use query::{Intent, ParsedQuery, SortHint};
pub use retrieval_planner::{RetrievalOutcome, RetrievalPlan, RetrievalPlanner, RetrievalStatus};
