//! Grounding context: retrieved movies rendered as plain text for synthesis.

use crate::types::Movie;

/// Movies rendered into a single prompt.
pub const MAX_CONTEXT_MOVIES: usize = 15;
const MAX_CONTEXT_CAST: usize = 5;
const MAX_PLOT_CHARS: usize = 300;

pub const NO_MOVIES_CONTEXT: &str = "(No movies found in the database matching the query.)";

/// Render movies as the fact list the generator may draw on.
///
/// Only fields present on the records are written, so the context never
/// states anything the store did not return.
pub fn format_movie_context(movies: &[Movie]) -> String {
    if movies.is_empty() {
        return NO_MOVIES_CONTEXT.to_string();
    }

    movies
        .iter()
        .take(MAX_CONTEXT_MOVIES)
        .map(format_movie)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn format_movie(movie: &Movie) -> String {
    let mut block = format!("- {}", movie.display_title());

    if let Some(rating) = movie.vote_average.filter(|r| *r > 0.0) {
        block.push_str(&format!("\n  Rating: {}/10", rating));
    }
    if !movie.genres.is_empty() {
        block.push_str(&format!("\n  Genres: {}", movie.genres.join(", ")));
    }
    if !movie.directors.is_empty() {
        block.push_str(&format!("\n  Director(s): {}", movie.directors.join(", ")));
    }
    if !movie.cast.is_empty() {
        let names: Vec<&str> = movie
            .cast
            .iter()
            .take(MAX_CONTEXT_CAST)
            .map(|c| c.name.as_str())
            .collect();
        block.push_str(&format!("\n  Cast: {}", names.join(", ")));
    }
    if let Some(overview) = movie.overview.as_deref().filter(|o| !o.trim().is_empty()) {
        let plot: String = overview.chars().take(MAX_PLOT_CHARS).collect();
        block.push_str(&format!("\n  Plot: {}", plot));
    }
    if let Some(stats) = movie.user_rating {
        block.push_str(&format!(
            "\n  User rating: {}/5 ({} ratings)",
            stats.mean, stats.count
        ));
    }
    block
}
