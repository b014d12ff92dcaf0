//! Intent Classifier
//!
//! Deterministic, rule-ordered classification of a user message into one of
//! the six intents. Rules are evaluated in priority order and the first
//! match wins; a message matching nothing is `General`.

use std::sync::LazyLock;

use super::parameter_extractor::{compare_candidates, quoted_titles};
use super::query::{normalize, truncate_chars, Intent};

static COMPARE_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"\b(?:compare[sd]?|comparison|vs|versus|or|difference\s+between|better|worse)\b",
    )
    .expect("compare regex is valid")
});

static CAST_CREW_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"\bwho\s+(?:directed|directs|made|stars?|starred|acted|plays?|played|is\s+in|was\s+in|are\s+the\s+(?:actors?|cast)|is\s+the\s+director)\b|\b(?:directed\s+by|starring|featuring)\b|\b(?:movies?|films?)\s+(?:with|by|starring|featuring)\b|\b(?:cast|crew|directors?|actors?|actress(?:es)?)\s+(?:of|in|for)\b|\bwith\s+.+\s+in\s+(?:it|them)\b",
    )
    .expect("cast/crew regex is valid")
});

static TOP_RATED_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"\b(?:top|best|highest[\s-]rated|top[\s-]rated|best[\s-]rated|greatest|worst|lowest[\s-]rated|worst[\s-]rated|most\s+popular|all[\s-]time)\b",
    )
    .expect("top-rated regex is valid")
});

static RECOMMEND_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"\b(?:recommend\w*|suggest\w*|similar\s+to|(?:movies?|films?|something|anything)\s+like|give\s+me|show\s+me|find\s+me|any\s+good|looking\s+for|what\s+should\s+i\s+watch)\b",
    )
    .expect("recommend regex is valid")
});

static LOOKUP_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"\b(?:tell\s+me\s+(?:more\s+)?about|what\s+is|what's|whats|what\s+was|info(?:rmation)?\s+(?:about|on)|(?:plot|overview|synopsis|summary)\s+of|describe|details\s+(?:of|on|about))\b",
    )
    .expect("lookup regex is valid")
});

/// One message as seen by the rules: the truncated original (titles are
/// case-sensitive) and its normalized form.
pub struct ClassifierInput<'a> {
    pub original: &'a str,
    pub normalized: String,
}

type Rule = fn(&IntentClassifier, &ClassifierInput<'_>) -> bool;

pub struct IntentClassifier {
    max_input_chars: usize,
}

impl IntentClassifier {
    /// Rule table in priority order.
    const RULES: [(Intent, Rule); 5] = [
        (Intent::Compare, IntentClassifier::is_compare),
        (Intent::CastCrew, IntentClassifier::is_cast_crew),
        (Intent::TopRated, IntentClassifier::is_top_rated),
        (Intent::Recommend, IntentClassifier::is_recommend),
        (Intent::Lookup, IntentClassifier::is_lookup),
    ];

    pub fn new(max_input_chars: usize) -> Self {
        Self { max_input_chars }
    }

    pub fn classify(&self, query: &str) -> Intent {
        let input = self.prepare(query);
        Self::RULES
            .iter()
            .find(|(_, rule)| rule(self, &input))
            .map(|(intent, _)| *intent)
            .unwrap_or(Intent::General)
    }

    /// Every intent whose rule matches, in priority order.
    pub fn matching_rules(&self, query: &str) -> Vec<Intent> {
        let input = self.prepare(query);
        Self::RULES
            .iter()
            .filter(|(_, rule)| rule(self, &input))
            .map(|(intent, _)| *intent)
            .collect()
    }

    fn prepare<'a>(&self, query: &'a str) -> ClassifierInput<'a> {
        let original = truncate_chars(query, self.max_input_chars);
        ClassifierInput {
            original,
            normalized: normalize(original, self.max_input_chars),
        }
    }

    /// Comparison keyword plus at least two title candidates.
    fn is_compare(&self, input: &ClassifierInput<'_>) -> bool {
        COMPARE_RE.is_match(&input.normalized) && compare_candidates(input.original).len() >= 2
    }

    fn is_cast_crew(&self, input: &ClassifierInput<'_>) -> bool {
        CAST_CREW_RE.is_match(&input.normalized)
    }

    fn is_top_rated(&self, input: &ClassifierInput<'_>) -> bool {
        TOP_RATED_RE.is_match(&input.normalized)
    }

    // Bare "like" is not a trigger: "I'd like a drama" is not a similarity request.
    fn is_recommend(&self, input: &ClassifierInput<'_>) -> bool {
        RECOMMEND_RE.is_match(&input.normalized)
    }

    fn is_lookup(&self, input: &ClassifierInput<'_>) -> bool {
        LOOKUP_RE.is_match(&input.normalized) || !quoted_titles(input.original).is_empty()
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> Intent {
        IntentClassifier::default().classify(text)
    }

    #[test]
    fn test_lookup_detection() {
        assert_eq!(classify("Tell me about Inception"), Intent::Lookup);
        assert_eq!(classify("What is the plot of Interstellar?"), Intent::Lookup);
        assert_eq!(classify("Describe the movie Gladiator"), Intent::Lookup);
        assert_eq!(classify(r#"What is the movie "The Matrix"?"#), Intent::Lookup);
        assert_eq!(classify(r#""Heat""#), Intent::Lookup);
    }

    #[test]
    fn test_recommend_detection() {
        assert_eq!(classify("Recommend action movies"), Intent::Recommend);
        assert_eq!(classify("I'm looking for sci-fi movies"), Intent::Recommend);
        assert_eq!(classify("Show me some thriller movies"), Intent::Recommend);
        assert_eq!(classify(r#"Movies like "Inception""#), Intent::Recommend);
    }

    #[test]
    fn test_bare_like_is_not_recommend() {
        assert_eq!(classify("I'd like a drama"), Intent::General);
    }

    #[test]
    fn test_compare_detection() {
        assert_eq!(classify(r#"Compare "The Godfather" and "Goodfellas""#), Intent::Compare);
        assert_eq!(classify("Compare Inception and Interstellar"), Intent::Compare);
        assert_eq!(classify("Alien vs Aliens"), Intent::Compare);
        assert_eq!(classify("Is Alien or Aliens better?"), Intent::Compare);
    }

    #[test]
    fn test_compare_needs_two_candidates() {
        // A lone "or" between lower-case words does not name two titles.
        assert_eq!(classify("Recommend action or comedy movies"), Intent::Recommend);
        assert_eq!(classify(r#"Compare "Inception""#), Intent::Lookup);
    }

    #[test]
    fn test_capitalized_genres_are_not_a_comparison() {
        assert_eq!(classify("Recommend a Comedy or Drama"), Intent::Recommend);
        assert_eq!(classify("Show me Horror or Thriller picks"), Intent::Recommend);
    }

    #[test]
    fn test_top_rated_detection() {
        assert_eq!(classify("Top 5 highest rated horror movies"), Intent::TopRated);
        assert_eq!(classify("Best movies of 2015"), Intent::TopRated);
        assert_eq!(classify("Greatest movies of all time"), Intent::TopRated);
        assert_eq!(classify("worst movies of 2010"), Intent::TopRated);
    }

    #[test]
    fn test_cast_crew_detection() {
        assert_eq!(classify("Who directed Inception?"), Intent::CastCrew);
        assert_eq!(classify("Movies with Tom Hanks"), Intent::CastCrew);
        assert_eq!(classify(r#"Cast of "Pulp Fiction""#), Intent::CastCrew);
        assert_eq!(classify("Movies directed by Christopher Nolan"), Intent::CastCrew);
    }

    #[test]
    fn test_general_fallback() {
        assert_eq!(classify("hello"), Intent::General);
        assert_eq!(classify("What are some fun things to watch on a rainy day?"), Intent::General);
        assert_eq!(classify(""), Intent::General);
        assert_eq!(classify("   \n\t "), Intent::General);
    }

    #[test]
    fn test_priority_order_first_match_wins() {
        let classifier = IntentClassifier::default();
        let text = "Best movies directed by Christopher Nolan";
        assert_eq!(
            classifier.matching_rules(text),
            vec![Intent::CastCrew, Intent::TopRated]
        );
        assert_eq!(classifier.classify(text), Intent::CastCrew);

        let text = r#"Is "Alien" better than "Aliens"? Recommend one"#;
        assert_eq!(classifier.classify(text), Intent::Compare);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let classifier = IntentClassifier::default();
        for text in ["Tell me about Inception", "Top 10 comedies", "hello", "Alien vs Aliens"] {
            assert_eq!(classifier.classify(text), classifier.classify(text));
        }
    }

    #[test]
    fn test_long_input_does_not_panic() {
        let text = "ñ".repeat(10_000);
        assert_eq!(IntentClassifier::new(1000).classify(&text), Intent::General);
    }
}
