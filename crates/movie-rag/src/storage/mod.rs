//! Structured movie store: the single source of facts for every answer.

pub mod pool;
pub mod schema;
pub mod sqlite_store;

#[cfg(test)]
pub(crate) mod fixtures;

use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::types::Movie;

pub use pool::ReadPool;
pub use sqlite_store::SqliteMovieStore;

/// Ordering applied to a filtered search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Popularity,
    Rating,
    Year,
    Title,
    Revenue,
    /// Blend of rating and capped popularity, used for recommendations.
    Composite,
}

impl SortKey {
    /// Parse a sort name; unknown names fall back to popularity.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "rating" => SortKey::Rating,
            "year" => SortKey::Year,
            "title" => SortKey::Title,
            "revenue" => SortKey::Revenue,
            "composite" => SortKey::Composite,
            _ => SortKey::Popularity,
        }
    }

    /// The direction used when the caller does not pick one.
    pub fn default_direction(&self) -> SortDirection {
        match self {
            SortKey::Title => SortDirection::Ascending,
            _ => SortDirection::Descending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// Filters for `MovieStore::search_movies`. Empty fields do not filter.
///
/// Text filters are partial and case-insensitive, except `exact_title`
/// which matches the whole title ignoring case. Every value is bound as a
/// query parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieFilters {
    pub title: Option<String>,
    #[serde(default)]
    pub exact_title: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub director: Option<String>,
    pub actor: Option<String>,
    pub min_votes: Option<i64>,
    pub exclude_id: Option<i64>,
    pub sort: SortKey,
    pub direction: Option<SortDirection>,
    pub limit: usize,
    pub offset: usize,
}

impl MovieFilters {
    pub fn new(sort: SortKey, limit: usize) -> Self {
        Self {
            title: None,
            exact_title: None,
            genre: None,
            year: None,
            year_from: None,
            year_to: None,
            director: None,
            actor: None,
            min_votes: None,
            exclude_id: None,
            sort,
            direction: None,
            limit,
            offset: 0,
        }
    }

    pub fn direction(&self) -> SortDirection {
        self.direction.unwrap_or_else(|| self.sort.default_direction())
    }
}

impl Default for MovieFilters {
    fn default() -> Self {
        Self::new(SortKey::Popularity, 20)
    }
}

/// Read access to the movie catalogue.
///
/// Errors mean the data could not be read. An empty result is always a
/// successful `Ok(vec![])`, never an error.
pub trait MovieStore: Send + Sync {
    /// Filtered search. Results carry genres, directors and top-5 cast.
    fn search_movies(&self, filters: &MovieFilters) -> StoreResult<Vec<Movie>>;

    /// Full record with top-10 cast and user-rating statistics.
    fn get_movie_detail(&self, id: i64) -> StoreResult<Option<Movie>>;

    fn list_genres(&self) -> StoreResult<Vec<String>>;

    /// Whether the catalogue can be queried right now.
    fn health_check(&self) -> bool;
}
