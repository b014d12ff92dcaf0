//! Query model shared by the classifier, extractor and planner.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Lookup,
    Recommend,
    Compare,
    TopRated,
    CastCrew,
    General,
}

impl Intent {
    pub const ALL: [Intent; 6] = [
        Intent::Lookup,
        Intent::Recommend,
        Intent::Compare,
        Intent::TopRated,
        Intent::CastCrew,
        Intent::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Lookup => "lookup",
            Intent::Recommend => "recommend",
            Intent::Compare => "compare",
            Intent::TopRated => "top_rated",
            Intent::CastCrew => "cast_crew",
            Intent::General => "general",
        }
    }

    /// Whether rating direction is meaningful for this intent.
    pub fn is_ranked(&self) -> bool {
        matches!(self, Intent::TopRated | Intent::Recommend)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rating sort direction requested by superlatives ("best" / "worst").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortHint {
    Descending,
    Ascending,
}

/// Structured understanding of one user message.
///
/// Fields that do not apply to `intent` may still be populated; downstream
/// code ignores them rather than treating them as errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedQuery {
    pub intent: Intent,
    pub titles: Vec<String>,
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub director: Option<String>,
    pub actor: Option<String>,
    pub limit: Option<usize>,
    pub sort_hint: Option<SortHint>,
}

impl ParsedQuery {
    pub fn new(intent: Intent) -> Self {
        Self {
            intent,
            titles: Vec::new(),
            genre: None,
            year: None,
            year_from: None,
            year_to: None,
            director: None,
            actor: None,
            limit: None,
            sort_hint: None,
        }
    }

    pub fn first_title(&self) -> Option<&str> {
        self.titles.first().map(|t| t.as_str())
    }

    pub fn has_person(&self) -> bool {
        self.director.is_some() || self.actor.is_some()
    }
}

impl Default for ParsedQuery {
    fn default() -> Self {
        Self::new(Intent::General)
    }
}

/// Lower-case and collapse whitespace, after truncating to `max_chars`.
///
/// Truncation happens on a char boundary so multi-byte input never panics.
pub fn normalize(text: &str, max_chars: usize) -> String {
    truncate_chars(text, max_chars)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Truncate to at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
