//! Query understanding facade: classify, then extract.

use super::intent_classifier::IntentClassifier;
use super::parameter_extractor::ParameterExtractor;
use super::query::ParsedQuery;
use crate::config::MovieRagConfig;

pub struct QueryAnalyzer {
    intent_classifier: IntentClassifier,
    parameter_extractor: ParameterExtractor,
}

impl QueryAnalyzer {
    pub fn new(config: &MovieRagConfig) -> Self {
        let max_chars = config.query.max_input_chars;
        Self {
            intent_classifier: IntentClassifier::new(max_chars),
            parameter_extractor: ParameterExtractor::new(max_chars, config.retrieval.max_results),
        }
    }

    pub fn analyze(&self, message: &str) -> ParsedQuery {
        // Step 1: Classify intent
        let intent = self.intent_classifier.classify(message);

        // Step 2: Extract parameters for that intent
        self.parameter_extractor.extract(message, intent)
    }
}

impl Default for QueryAnalyzer {
    fn default() -> Self {
        Self::new(&MovieRagConfig::default())
    }
}
