//! Deterministic messages used when no generated answer is available.
//!
//! Templates only restate what is in the retrieved records; they never add
//! facts of their own.

use crate::rag::Intent;
use crate::types::Movie;

/// Titles listed in a degraded answer.
const MAX_LISTED: usize = 10;
/// Cast members named in a single-movie cast listing.
const MAX_CAST_LISTED: usize = 10;

pub const NO_MATCH_MESSAGE: &str = "I couldn't find any movies in the database matching your question. \
Try a different title, genre, year, or person.";

pub const GENERAL_UNAVAILABLE_MESSAGE: &str = "I can only answer questions from the movie database, \
and the assistant is temporarily unavailable. Try asking about a specific movie, genre, year, actor, or director.";

const DEGRADED_NOTE: &str = "(The assistant is temporarily unavailable, so this is a plain list of the matching records.)";

/// Message for a request whose synthesis failed or was not attempted.
pub fn degraded_message(intent: Intent, movies: &[Movie]) -> String {
    if movies.is_empty() {
        return match intent {
            Intent::General => GENERAL_UNAVAILABLE_MESSAGE.to_string(),
            _ => NO_MATCH_MESSAGE.to_string(),
        };
    }

    let mut message = String::from(heading(intent, movies.len()));
    let with_cast = intent == Intent::CastCrew && movies.len() == 1;
    for movie in movies.iter().take(MAX_LISTED) {
        message.push_str(&format!("\n- {}", summary_line(movie, with_cast)));
    }
    if movies.len() > MAX_LISTED {
        message.push_str(&format!("\n...and {} more.", movies.len() - MAX_LISTED));
    }
    message.push_str("\n\n");
    message.push_str(DEGRADED_NOTE);
    message
}

/// Message asking the user for what the query was missing.
pub fn clarifying_message(intent: Intent, reason: &str) -> String {
    let ask = match intent {
        Intent::Lookup => {
            "Which movie would you like to know about? Putting the title in quotes helps, e.g. \"Inception\"."
        }
        Intent::Compare => {
            "Please name two movies to compare, e.g. Compare \"The Godfather\" and \"Goodfellas\"."
        }
        Intent::CastCrew => {
            "Which movie or person do you mean? Try \"Who directed Inception?\" or \"Movies with Tom Hanks\"."
        }
        _ => "Could you rephrase that with a movie title, genre, year, or person?",
    };
    format!("I couldn't answer that yet: {}. {}", reason, ask)
}

fn heading(intent: Intent, count: usize) -> &'static str {
    match intent {
        Intent::Compare => "Here are the two movies you asked to compare:",
        Intent::TopRated => "Here are the highest-ranked matches from the movie database:",
        Intent::Recommend => "Here are some matching movies from the database:",
        Intent::CastCrew if count == 1 => "Here is the cast and crew from the movie database:",
        Intent::CastCrew => "Here are the matching movies from the database:",
        _ if count == 1 => "Here's what I found in the movie database:",
        _ => "Here are the matching movies from the database:",
    }
}

fn summary_line(movie: &Movie, with_cast: bool) -> String {
    let mut line = movie.display_title();
    if let Some(rating) = movie.vote_average.filter(|r| *r > 0.0) {
        line.push_str(&format!(", rated {}/10", rating));
    }
    if !movie.directors.is_empty() {
        line.push_str(&format!(", directed by {}", movie.directors.join(", ")));
    }
    if !movie.genres.is_empty() {
        line.push_str(&format!(" [{}]", movie.genres.join(", ")));
    }
    if with_cast && !movie.cast.is_empty() {
        let cast: Vec<String> = movie
            .cast
            .iter()
            .take(MAX_CAST_LISTED)
            .map(|member| match member.character.as_deref().filter(|c| !c.trim().is_empty()) {
                Some(character) => format!("{} ({})", member.name, character),
                None => member.name.clone(),
            })
            .collect();
        line.push_str(&format!(", starring {}", cast.join(", ")));
    }
    line
}
