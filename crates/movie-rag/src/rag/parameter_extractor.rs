//! Parameter Extractor
//!
//! Pulls titles, genre, year filters, people, result limits and sort
//! direction out of a message. Every rule is optional: a rule that finds
//! nothing leaves its field empty, it never guesses a default.

use chrono::Datelike;
use std::sync::LazyLock;

use super::query::{normalize, truncate_chars, Intent, ParsedQuery, SortHint};

// ============================================================================
// Vocabulary
// ============================================================================

/// Canonical genre names as stored in the catalogue.
pub const KNOWN_GENRES: [&str; 20] = [
    "Action", "Adventure", "Animation", "Comedy", "Crime",
    "Documentary", "Drama", "Family", "Fantasy", "Foreign",
    "History", "Horror", "Music", "Mystery", "Romance",
    "Science Fiction", "TV Movie", "Thriller", "War", "Western",
];

/// Surface forms mapped to their canonical genre.
const GENRE_ALIASES: &[(&str, &str)] = &[
    ("science fiction", "Science Fiction"),
    ("sci-fi", "Science Fiction"),
    ("sci fi", "Science Fiction"),
    ("scifi", "Science Fiction"),
    ("tv movies", "TV Movie"),
    ("tv movie", "TV Movie"),
    ("action", "Action"),
    ("adventures", "Adventure"),
    ("adventure", "Adventure"),
    ("animation", "Animation"),
    ("animated", "Animation"),
    ("comedies", "Comedy"),
    ("comedy", "Comedy"),
    ("crime", "Crime"),
    ("documentaries", "Documentary"),
    ("documentary", "Documentary"),
    ("dramas", "Drama"),
    ("drama", "Drama"),
    ("family", "Family"),
    ("fantasy", "Fantasy"),
    ("foreign", "Foreign"),
    ("historical", "History"),
    ("history", "History"),
    ("horror", "Horror"),
    ("musicals", "Music"),
    ("musical", "Music"),
    ("music", "Music"),
    ("mysteries", "Mystery"),
    ("mystery", "Mystery"),
    ("romances", "Romance"),
    ("romantic", "Romance"),
    ("romance", "Romance"),
    ("thrillers", "Thriller"),
    ("thriller", "Thriller"),
    ("war", "War"),
    ("westerns", "Western"),
    ("western", "Western"),
];

const NUMBER_WORDS: &[(&str, usize)] = &[
    ("one", 1), ("two", 2), ("three", 3), ("four", 4), ("five", 5),
    ("six", 6), ("seven", 7), ("eight", 8), ("nine", 9), ("ten", 10),
    ("eleven", 11), ("twelve", 12), ("thirteen", 13), ("fourteen", 14),
    ("fifteen", 15), ("sixteen", 16), ("seventeen", 17), ("eighteen", 18),
    ("nineteen", 19), ("twenty", 20),
];

/// Earliest year accepted as a release-year filter.
const MIN_YEAR: i32 = 1870;

// Longest aliases first so "science fiction" wins over shorter overlaps.
static GENRE_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    let mut aliases: Vec<&str> = GENRE_ALIASES.iter().map(|(alias, _)| *alias).collect();
    aliases.sort_by_key(|a| std::cmp::Reverse(a.len()));
    let alternation = aliases
        .iter()
        .map(|a| regex::escape(a))
        .collect::<Vec<_>>()
        .join("|");
    regex::Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).expect("genre regex is valid")
});

static QUOTED_TITLE_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r#"["\u{201c}\u{201d}]([^"\u{201c}\u{201d}]+)["\u{201c}\u{201d}]"#)
        .expect("quoted title regex is valid")
});

static YEAR_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"\b(\d{4})\b").expect("year regex is valid"));
static YEAR_RANGE_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"(?i)\b(?:from|between)\s+(\d{4})\s*(?:to|and|-|until|through|till)\s*(\d{4})\b",
    )
    .expect("year range regex is valid")
});
static FULL_DECADE_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"\b(18[7-9]|19\d|20\d)0s\b").expect("decade regex is valid")
});
static SHORT_DECADE_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"(?:^|[^\w'])'?(\d)0s\b").expect("short decade regex is valid")
});

static TOP_N_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    let words = number_word_alternation(1);
    regex::Regex::new(&format!(r"\b(?:top|best|worst|first|bottom)\s+(\d{{1,3}}|{})\b", words))
        .expect("top-n regex is valid")
});
// "one" is left out here: "one of the best movies" is not a count.
static COUNT_N_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    let words = number_word_alternation(2);
    regex::Regex::new(&format!(
        r"\b(\d{{1,3}}|{})\s+(?:[\w-]+\s+){{0,3}}?(?:movies|films|titles|picks|recommendations|suggestions)\b",
        words
    ))
    .expect("count regex is valid")
});

fn number_word_alternation(min: usize) -> String {
    NUMBER_WORDS
        .iter()
        .filter(|(_, n)| *n >= min)
        .map(|(word, _)| *word)
        .collect::<Vec<_>>()
        .join("|")
}

static DESC_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"\b(?:best|top|highest[\s-]rated|top[\s-]rated|best[\s-]rated|greatest|finest)\b",
    )
    .expect("descending regex is valid")
});
static ASC_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"\b(?:worst|lowest[\s-]rated|worst[\s-]rated|bottom|most\s+overrated)\b")
        .expect("ascending regex is valid")
});

static ABOUT_TITLE_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"(?i)\b(?:tell\s+me\s+(?:more\s+)?about(?:\s+the\s+(?:movie|film))?|what(?:'s|\s+is|\s+was)(?:\s+the\s+(?:plot|story|premise|synopsis)\s+of)?(?:\s+the\s+(?:movie|film))?|info(?:rmation)?\s+(?:on|about)|(?:plot|overview|synopsis|summary|details)\s+(?:of|on|for|about)|describe(?:\s+the\s+(?:movie|film))?|about)\s+(.+?)\s*[?.!]*\s*$",
    )
    .expect("about-title regex is valid")
});
static CREW_TITLE_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"(?i)\b(?:who\s+(?:directed|directs|made|starred\s+in|stars\s+in|acted\s+in|was\s+in|is\s+in|plays?\s+in|played\s+in|are\s+the\s+(?:actors?|cast)\s+(?:of|in)|is\s+the\s+director\s+of)|(?:cast|crew|director|directors|actors?|actress(?:es)?)\s+(?:of|in|for))\s+(.+?)\s*[?.!]*\s*$",
    )
    .expect("crew-title regex is valid")
});
static SIMILAR_TITLE_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"(?i)\b(?:similar\s+to|(?:movies?|films?|something|anything)\s+like)\s+(.+?)\s*[?.!]*\s*$",
    )
    .expect("similar-title regex is valid")
});

static DIRECTOR_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"(?i)\b(?:directed\s+by|(?:movies?|films?)\s+by|made\s+by)\s+(.+?)\s*(?:[?.!,;]|$)")
        .expect("director regex is valid")
});
static ACTOR_IN_IT_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"(?i)\bwith\s+(.+?)\s+in\s+(?:it|them)\b").expect("in-it regex is valid")
});
static ACTOR_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"(?i)\b(?:(?:movies?|films?)\s+(?:with|starring|featuring)|starring|featuring)\s+(.+?)\s*(?:[?.!,;]|$)",
    )
    .expect("actor regex is valid")
});
static TRAILING_TIME_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"(?i)\s+(?:in|from|after|before|since|during)\s+(?:the\s+)?'?\d{2,4}s?\b.*$")
        .expect("trailing time regex is valid")
});

static COMPARE_PREFIX_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"(?i)^\s*(?:compare|comparison\s+of|difference\s+between|which\s+is\s+better[,:]?)\s+(.+?)\s+(?:and|vs\.?|versus|or|with|to)\s+(.+?)\s*[?.!]*\s*$",
    )
    .expect("compare prefix regex is valid")
});
static VERSUS_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"(?i)^\s*(.+?)\s+(?:vs\.?|versus)\s+(.+?)\s*[?.!]*\s*$")
        .expect("versus regex is valid")
});
static CAPITALIZED_OR_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"\b([A-Z][\w':-]*(?:\s+[A-Z][\w':-]*)*)\s+or\s+([A-Z][\w':-]*(?:\s+[A-Z][\w':-]*)*)",
    )
    .expect("capitalized-or regex is valid")
});

/// Leading words dropped from an unquoted comparison candidate.
const COMPARE_FILLERS: &[&str] = &[
    "is", "was", "should", "would", "which", "do", "does", "did", "i", "watch", "see",
];

/// First words that disqualify a captured person name.
const PERSON_STOPWORDS: &[&str] = &[
    "a", "an", "the", "some", "great", "good", "lots", "high", "low", "my", "your", "me", "us",
];

/// Question and command words that start a sentence without naming anything.
const SENTENCE_STARTERS: &[&str] = &[
    "who", "what", "whats", "what's", "which", "when", "where", "why", "how", "tell", "describe",
    "show", "give", "find", "is", "was", "are", "were", "did", "does", "do", "can", "could",
    "would", "should", "please", "i", "hey", "hi", "hello", "recommend", "suggest", "compare",
    "list", "movies", "films", "movie", "film",
];

/// Lower-case words allowed inside a capitalized title run.
const TITLE_CONNECTORS: &[&str] = &["of", "the", "a", "an", "and", "in", "on", "to", "for"];

// ============================================================================
// Extractor
// ============================================================================

pub struct ParameterExtractor {
    max_input_chars: usize,
    max_limit: usize,
    max_year: i32,
}

impl ParameterExtractor {
    pub fn new(max_input_chars: usize, max_limit: usize) -> Self {
        Self {
            max_input_chars,
            max_limit,
            max_year: chrono::Utc::now().year() + 2,
        }
    }

    pub fn extract(&self, text: &str, intent: Intent) -> ParsedQuery {
        let text = truncate_chars(text, self.max_input_chars).trim();
        let normalized = normalize(text, self.max_input_chars);

        let mut query = ParsedQuery::new(intent);
        query.genre = extract_genre(text);

        let years = self.extract_years(text);
        query.year = years.exact;
        query.year_from = years.from;
        query.year_to = years.to;

        query.limit = self.extract_limit(&normalized);
        if intent.is_ranked() {
            query.sort_hint = extract_sort_hint(&normalized);
        }

        query.director = extract_director(text);
        query.actor = extract_actor(text);
        query.titles = extract_titles(text, intent, query.has_person());

        query
    }

    fn extract_years(&self, text: &str) -> YearFilter {
        if let Some(caps) = YEAR_RANGE_RE.captures(text) {
            let a = caps[1].parse::<i32>().ok().filter(|y| self.plausible_year(*y));
            let b = caps[2].parse::<i32>().ok().filter(|y| self.plausible_year(*y));
            if let (Some(a), Some(b)) = (a, b) {
                return YearFilter {
                    exact: None,
                    from: Some(a.min(b)),
                    to: Some(a.max(b)),
                };
            }
        }

        if let Some(caps) = FULL_DECADE_RE.captures(text) {
            if let Ok(prefix) = caps[1].parse::<i32>() {
                let start = prefix * 10;
                if self.plausible_year(start) {
                    return YearFilter {
                        exact: None,
                        from: Some(start),
                        to: Some(start + 9),
                    };
                }
            }
        }

        if let Some(caps) = SHORT_DECADE_RE.captures(text) {
            if let Ok(digit) = caps[1].parse::<i32>() {
                let start = if digit >= 3 { 1900 + digit * 10 } else { 2000 + digit * 10 };
                if self.plausible_year(start) {
                    return YearFilter {
                        exact: None,
                        from: Some(start),
                        to: Some(start + 9),
                    };
                }
            }
        }

        // The most recently mentioned plausible year wins.
        let exact = YEAR_RE
            .captures_iter(text)
            .filter_map(|caps| caps[1].parse::<i32>().ok())
            .filter(|y| self.plausible_year(*y))
            .last();

        YearFilter {
            exact,
            from: None,
            to: None,
        }
    }

    fn plausible_year(&self, year: i32) -> bool {
        (MIN_YEAR..=self.max_year).contains(&year)
    }

    fn extract_limit(&self, normalized: &str) -> Option<usize> {
        let from_top = TOP_N_RE
            .captures(normalized)
            .and_then(|caps| parse_count(&caps[1]));
        let count = from_top.or_else(|| {
            COUNT_N_RE
                .captures(normalized)
                .and_then(|caps| parse_count(&caps[1]))
        })?;

        if count == 0 {
            return None;
        }
        Some(count.min(self.max_limit))
    }
}

impl Default for ParameterExtractor {
    fn default() -> Self {
        Self::new(1000, 50)
    }
}

struct YearFilter {
    exact: Option<i32>,
    from: Option<i32>,
    to: Option<i32>,
}

fn parse_count(token: &str) -> Option<usize> {
    if let Ok(n) = token.parse::<usize>() {
        return Some(n);
    }
    NUMBER_WORDS
        .iter()
        .find(|(word, _)| *word == token)
        .map(|(_, n)| *n)
}

// ============================================================================
// Field rules
// ============================================================================

/// The genre whose alias appears earliest in the text.
pub fn extract_genre(text: &str) -> Option<String> {
    let found = GENRE_RE.find(text)?;
    let matched = found.as_str().to_lowercase();
    let matched = matched.split_whitespace().collect::<Vec<_>>().join(" ");
    GENRE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == matched)
        .map(|(_, canonical)| canonical.to_string())
}

/// Direction of the earliest superlative in a normalized message.
pub fn extract_sort_hint(normalized: &str) -> Option<SortHint> {
    let desc = DESC_RE.find(normalized).map(|m| m.start());
    let asc = ASC_RE.find(normalized).map(|m| m.start());
    match (desc, asc) {
        (Some(d), Some(a)) if a < d => Some(SortHint::Ascending),
        (Some(_), _) => Some(SortHint::Descending),
        (None, Some(_)) => Some(SortHint::Ascending),
        (None, None) => None,
    }
}

/// Quoted substrings, verbatim, in order of appearance.
pub fn quoted_titles(text: &str) -> Vec<String> {
    QUOTED_TITLE_RE
        .captures_iter(text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Two-title candidates for a comparison, quoted titles first.
pub fn compare_candidates(text: &str) -> Vec<String> {
    let quoted = quoted_titles(text);
    if quoted.len() >= 2 {
        return quoted;
    }

    let pair = COMPARE_PREFIX_RE
        .captures(text)
        .or_else(|| VERSUS_RE.captures(text))
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .or_else(|| {
            CAPITALIZED_OR_RE
                .captures(text)
                .map(|caps| (strip_compare_fillers(&caps[1]), caps[2].to_string()))
        });

    match pair {
        Some((a, b)) => {
            let titles: Vec<String> = [a, b]
                .iter()
                .filter_map(|t| clean_title(t))
                .filter(|t| !is_genre_phrase(t))
                .collect();
            if titles.len() == 2 && !titles[0].eq_ignore_ascii_case(&titles[1]) {
                titles
            } else {
                quoted
            }
        }
        None => quoted,
    }
}

fn strip_compare_fillers(candidate: &str) -> String {
    let words: Vec<&str> = candidate.split_whitespace().collect();
    let skip = words
        .iter()
        .take_while(|w| COMPARE_FILLERS.contains(&w.to_lowercase().as_str()) || is_sentence_starter(w))
        .count();
    words[skip..].join(" ")
}

/// A genre name, optionally followed by "movies"/"films", is not a title.
fn is_genre_phrase(candidate: &str) -> bool {
    let lower = candidate.to_lowercase();
    let mut words: Vec<&str> = lower.split_whitespace().collect();
    if words.len() > 1 && matches!(words.last(), Some(&("movies" | "films" | "movie" | "film"))) {
        words.pop();
    }
    let phrase = words.join(" ");
    GENRE_ALIASES.iter().any(|(alias, _)| *alias == phrase)
}

fn extract_titles(text: &str, intent: Intent, has_person: bool) -> Vec<String> {
    if intent == Intent::Compare {
        return compare_candidates(text);
    }

    let quoted = quoted_titles(text);
    if !quoted.is_empty() {
        return quoted;
    }

    let triggered = match intent {
        Intent::Lookup => capture_title(&ABOUT_TITLE_RE, text),
        Intent::CastCrew if !has_person => {
            capture_title(&CREW_TITLE_RE, text).or_else(|| capture_title(&ABOUT_TITLE_RE, text))
        }
        Intent::Recommend => capture_title(&SIMILAR_TITLE_RE, text),
        _ => None,
    };
    if let Some(title) = triggered {
        return vec![title];
    }

    let wants_fallback = intent == Intent::Lookup || (intent == Intent::CastCrew && !has_person);
    if wants_fallback {
        if let Some(title) = capitalized_phrase(text) {
            return vec![title];
        }
    }

    Vec::new()
}

fn capture_title(re: &regex::Regex, text: &str) -> Option<String> {
    re.captures(text).and_then(|caps| clean_title(&caps[1]))
}

/// Strip filler around a captured title; `None` if nothing useful is left.
fn clean_title(raw: &str) -> Option<String> {
    let mut title = raw.trim().trim_end_matches(['?', '.', '!', ',', ';']).trim().to_string();
    title = TRAILING_TIME_RE.replace(&title, "").to_string();

    for prefix in ["the movie ", "the film ", "movie ", "film "] {
        let has_prefix = title
            .get(..prefix.len())
            .map_or(false, |head| head.eq_ignore_ascii_case(prefix));
        if has_prefix && title.len() > prefix.len() {
            title = title[prefix.len()..].to_string();
            break;
        }
    }
    for suffix in [" movie", " film"] {
        if title.len() > suffix.len()
            && title.is_char_boundary(title.len() - suffix.len())
            && title[title.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
        {
            title.truncate(title.len() - suffix.len());
        }
    }

    let title = title.trim().trim_matches(['"', '\'']).trim().to_string();
    if title.chars().count() > 1 {
        Some(title)
    } else {
        None
    }
}

pub fn extract_director(text: &str) -> Option<String> {
    DIRECTOR_RE
        .captures(text)
        .and_then(|caps| clean_person(&caps[1]))
}

pub fn extract_actor(text: &str) -> Option<String> {
    ACTOR_IN_IT_RE
        .captures(text)
        .and_then(|caps| clean_person(&caps[1]))
        .or_else(|| ACTOR_RE.captures(text).and_then(|caps| clean_person(&caps[1])))
}

/// Normalize a captured person span: cut trailing clauses, punctuation and
/// possessives.
fn clean_person(raw: &str) -> Option<String> {
    let mut name = TRAILING_TIME_RE.replace(raw.trim(), "").to_string();

    let lower = name.to_lowercase();
    let cut = [" in it", " in them", " and ", " or ", " in the ", " movies", " films"]
        .iter()
        .filter_map(|stop| lower.find(stop))
        .min();
    if let Some(idx) = cut.filter(|idx| name.is_char_boundary(*idx)) {
        name.truncate(idx);
    }

    let mut name = name
        .trim()
        .trim_end_matches(['?', '.', '!', ',', ';', ':'])
        .trim()
        .to_string();
    for possessive in ["'s", "\u{2019}s"] {
        if let Some(stripped) = name.strip_suffix(possessive) {
            name = stripped.to_string();
        }
    }
    let name = name.trim_matches(['"', '\'']).trim().to_string();

    let first_word = name.split_whitespace().next()?.to_lowercase();
    if PERSON_STOPWORDS.contains(&first_word.as_str()) || name.chars().count() <= 2 {
        return None;
    }
    Some(name)
}

/// Longest run of capitalized words, ignoring a leading question/command word.
fn capitalized_phrase(text: &str) -> Option<String> {
    let words: Vec<&str> = text
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'' && c != ':' && c != '-'))
        .collect();

    let mut best: Option<(usize, usize)> = None;
    let mut i = 0;
    while i < words.len() {
        if !is_capitalized(words[i]) || is_sentence_starter(words[i]) {
            i += 1;
            continue;
        }
        let start = i;
        let mut end = i + 1;
        while end < words.len() {
            if is_capitalized(words[end]) {
                end += 1;
                continue;
            }
            // "Lord of the Rings": connectors only count when a capital follows.
            let connectors = words[end..]
                .iter()
                .take_while(|w| TITLE_CONNECTORS.contains(*w))
                .count();
            let resumes = connectors > 0
                && words.get(end + connectors).map_or(false, |w| is_capitalized(w));
            if !resumes {
                break;
            }
            end += connectors + 1;
        }
        let better = best.map_or(true, |(s, e)| end - start > e - s);
        if better {
            best = Some((start, end));
        }
        i = end;
    }

    let (start, end) = best?;
    let run = &words[start..end];
    let meaningful = run
        .iter()
        .any(|w| !is_sentence_starter(w) && !TITLE_CONNECTORS.contains(&w.to_lowercase().as_str()));
    if !meaningful {
        return None;
    }
    clean_title(&run.join(" "))
}

fn is_capitalized(word: &str) -> bool {
    word.chars().next().map_or(false, |c| c.is_uppercase() || c.is_ascii_digit())
}

fn is_sentence_starter(word: &str) -> bool {
    SENTENCE_STARTERS.contains(&word.to_lowercase().as_str())
}

// ============================================================================
// Tests
// ============================================================================
