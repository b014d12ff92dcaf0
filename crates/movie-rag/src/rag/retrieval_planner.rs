//! Retrieval Planner
//!
//! Maps a `ParsedQuery` onto one parameterized store operation per intent
//! and executes it. Missing parameters are reported as
//! `RetrievalStatus::InsufficientParameters`; only store failures are errors.

use serde::{Deserialize, Serialize};

use super::query::{Intent, ParsedQuery, SortHint};
use crate::config::RetrievalConfig;
use crate::error::{StoreError, StoreResult};
use crate::storage::{MovieFilters, MovieStore, SortDirection, SortKey};
use crate::types::Movie;

// ============================================================================
// Plan Types
// ============================================================================

/// The concrete data-access operation chosen for a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RetrievalPlan {
    /// Exact match preferred, otherwise the best partial matches.
    TitleLookup { title: String, limit: usize },

    /// Genre/year filtered search, optionally seeded by a similar title.
    FilteredSearch {
        filters: MovieFilters,
        similar_to: Option<String>,
    },

    /// Two titles resolved independently, returned in the given order.
    TitlePair { first: String, second: String },

    /// Strict rating order over movies with enough votes.
    RatingRanked { filters: MovieFilters },

    /// Full cast and crew of one title.
    CastCrewByTitle { title: String },

    /// Movies credited to a person, newest first.
    Filmography { filters: MovieFilters },

    NoRetrieval,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RetrievalStatus {
    Complete,
    /// The query lacks what its intent needs; nothing was guessed.
    InsufficientParameters { reason: String },
    /// The intent does not read the store.
    NoRetrieval,
}

#[derive(Debug, Clone)]
pub struct RetrievalOutcome {
    pub plan: RetrievalPlan,
    pub movies: Vec<Movie>,
    pub status: RetrievalStatus,
}

impl RetrievalOutcome {
    fn insufficient(plan: RetrievalPlan, reason: impl Into<String>) -> Self {
        Self {
            plan,
            movies: Vec::new(),
            status: RetrievalStatus::InsufficientParameters {
                reason: reason.into(),
            },
        }
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self.status, RetrievalStatus::InsufficientParameters { .. })
    }
}

// ============================================================================
// Planner
// ============================================================================

pub struct RetrievalPlanner<'a> {
    store: &'a dyn MovieStore,
    config: &'a RetrievalConfig,
}

impl<'a> RetrievalPlanner<'a> {
    pub fn new(store: &'a dyn MovieStore, config: &'a RetrievalConfig) -> Self {
        Self { store, config }
    }

    /// Choose the plan for a query, or the reason it cannot be planned.
    pub fn plan(&self, query: &ParsedQuery) -> Result<RetrievalPlan, String> {
        match query.intent {
            Intent::Lookup => {
                let title = query
                    .first_title()
                    .ok_or_else(|| "no movie title was recognized".to_string())?;
                Ok(RetrievalPlan::TitleLookup {
                    title: title.to_string(),
                    limit: self.limit(query, self.config.lookup_limit),
                })
            }
            Intent::Recommend => {
                let mut filters = self.base_filters(query, SortKey::Composite, self.config.recommend_limit);
                filters.min_votes = Some(self.config.min_votes_for_ranking);
                Ok(RetrievalPlan::FilteredSearch {
                    filters,
                    similar_to: query
                        .first_title()
                        .filter(|_| query.genre.is_none())
                        .map(str::to_string),
                })
            }
            Intent::Compare => match query.titles.as_slice() {
                [first, second, ..] => Ok(RetrievalPlan::TitlePair {
                    first: first.clone(),
                    second: second.clone(),
                }),
                _ => Err("two movie titles are needed for a comparison".to_string()),
            },
            Intent::TopRated => {
                let mut filters = self.base_filters(query, SortKey::Rating, self.config.top_rated_limit);
                filters.min_votes = Some(self.config.min_votes_for_ranking);
                Ok(RetrievalPlan::RatingRanked { filters })
            }
            Intent::CastCrew => {
                if query.has_person() {
                    let mut filters = self.base_filters(query, SortKey::Year, self.config.cast_crew_limit);
                    filters.direction = Some(SortDirection::Descending);
                    filters.director = query.director.clone();
                    filters.actor = query.actor.clone();
                    Ok(RetrievalPlan::Filmography { filters })
                } else if let Some(title) = query.first_title() {
                    Ok(RetrievalPlan::CastCrewByTitle {
                        title: title.to_string(),
                    })
                } else {
                    Err("no movie title or person name was recognized".to_string())
                }
            }
            Intent::General => Ok(RetrievalPlan::NoRetrieval),
        }
    }

    /// Plan and run the query against the store.
    pub fn plan_and_execute(&self, query: &ParsedQuery) -> StoreResult<RetrievalOutcome> {
        let plan = match self.plan(query) {
            Ok(plan) => plan,
            Err(reason) => {
                tracing::debug!(intent = %query.intent, %reason, "Insufficient parameters");
                return Ok(RetrievalOutcome::insufficient(RetrievalPlan::NoRetrieval, reason));
            }
        };
        self.execute(plan)
    }

    pub fn execute(&self, plan: RetrievalPlan) -> StoreResult<RetrievalOutcome> {
        let (movies, status) = self.run(&plan)?;
        tracing::debug!(plan = ?plan, results = movies.len(), "Retrieval executed");
        Ok(RetrievalOutcome {
            plan,
            movies,
            status,
        })
    }

    fn run(&self, plan: &RetrievalPlan) -> StoreResult<(Vec<Movie>, RetrievalStatus)> {
        let movies = match plan {
            RetrievalPlan::TitleLookup { title, limit } => self.lookup_title(title, *limit)?,
            RetrievalPlan::FilteredSearch {
                filters,
                similar_to,
            } => {
                let mut filters = filters.clone();
                if let Some(seed_title) = similar_to {
                    self.seed_from_title(&mut filters, seed_title)?;
                }
                self.store.search_movies(&filters)?
            }
            RetrievalPlan::TitlePair { first, second } => {
                let a = self.resolve_title(first)?;
                let b = self.resolve_title(second)?;
                let reason = match (a, b) {
                    (Some(a), Some(b)) if a.id != b.id => {
                        return Ok((vec![a, b], RetrievalStatus::Complete));
                    }
                    (Some(_), Some(_)) => "both titles refer to the same movie".to_string(),
                    (None, _) => format!("no movie matching \"{}\" was found", first),
                    (_, None) => format!("no movie matching \"{}\" was found", second),
                };
                return Ok((Vec::new(), RetrievalStatus::InsufficientParameters { reason }));
            }
            RetrievalPlan::RatingRanked { filters } | RetrievalPlan::Filmography { filters } => {
                self.store.search_movies(filters)?
            }
            RetrievalPlan::CastCrewByTitle { title } => {
                self.resolve_title(title)?.into_iter().collect()
            }
            RetrievalPlan::NoRetrieval => return Ok((Vec::new(), RetrievalStatus::NoRetrieval)),
        };
        Ok((movies, RetrievalStatus::Complete))
    }

    /// Requested limit, else the intent default, never above `max_results`.
    fn limit(&self, query: &ParsedQuery, default: usize) -> usize {
        query.limit.unwrap_or(default).min(self.config.max_results).max(1)
    }

    fn base_filters(&self, query: &ParsedQuery, sort: SortKey, default_limit: usize) -> MovieFilters {
        let mut filters = MovieFilters::new(sort, self.limit(query, default_limit));
        filters.genre = query.genre.clone();
        filters.year = query.year;
        filters.year_from = query.year_from;
        filters.year_to = query.year_to;
        filters.direction = query.sort_hint.map(|hint| match hint {
            SortHint::Descending => SortDirection::Descending,
            SortHint::Ascending => SortDirection::Ascending,
        });
        filters
    }

    /// Candidates for a title: exact case-insensitive matches when any
    /// exist, otherwise partial matches by popularity.
    fn title_candidates(&self, title: &str, limit: usize) -> StoreResult<Vec<Movie>> {
        let limit = limit.min(self.config.max_results).max(1);

        let mut exact = MovieFilters::new(SortKey::Popularity, limit);
        exact.exact_title = Some(title.to_string());
        let matches = self.store.search_movies(&exact)?;
        if !matches.is_empty() {
            return Ok(matches);
        }

        let mut partial = MovieFilters::new(SortKey::Popularity, limit);
        partial.title = Some(title.to_string());
        self.store.search_movies(&partial)
    }

    fn lookup_title(&self, title: &str, limit: usize) -> StoreResult<Vec<Movie>> {
        self.title_candidates(title, limit)?
            .iter()
            .map(|m| self.detail(m.id))
            .collect()
    }

    fn resolve_title(&self, title: &str) -> StoreResult<Option<Movie>> {
        match self.title_candidates(title, 1)?.first() {
            Some(movie) => self.detail(movie.id).map(Some),
            None => Ok(None),
        }
    }

    /// A search hit must have a detail record; a gap means the catalogue is
    /// inconsistent, which is a store failure rather than "no match".
    fn detail(&self, id: i64) -> StoreResult<Movie> {
        self.store
            .get_movie_detail(id)?
            .ok_or(StoreError::NotFound { id })
    }

    fn seed_from_title(&self, filters: &mut MovieFilters, title: &str) -> StoreResult<()> {
        let Some(seed) = self.title_candidates(title, 1)?.into_iter().next() else {
            tracing::debug!(title, "Similar-to title not in catalogue; recommending without it");
            return Ok(());
        };
        filters.exclude_id = Some(seed.id);
        if filters.genre.is_none() {
            filters.genre = seed.genres.first().cloned();
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MovieRagConfig;
    use crate::rag::QueryAnalyzer;
    use crate::storage::fixtures;

    fn run(text: &str) -> (ParsedQuery, RetrievalOutcome) {
        let config = MovieRagConfig::default();
        let store = fixtures::seeded_store();
        let query = QueryAnalyzer::new(&config).analyze(text);
        let outcome = RetrievalPlanner::new(&store, &config.retrieval)
            .plan_and_execute(&query)
            .unwrap();
        (query, outcome)
    }

    fn titles(outcome: &RetrievalOutcome) -> Vec<&str> {
        outcome.movies.iter().map(|m| m.title.as_str()).collect()
    }

    #[test]
    fn test_lookup_prefers_exact_title() {
        let (query, outcome) = run("Tell me about Alien");
        assert_eq!(query.intent, Intent::Lookup);
        assert_eq!(titles(&outcome), vec!["Alien"]);
        assert_eq!(outcome.status, RetrievalStatus::Complete);
        // Lookup results carry the full detail record.
        assert!(outcome.movies[0].revenue.is_some());
    }

    #[test]
    fn test_lookup_inception_returns_single_record() {
        let (query, outcome) = run("Tell me about Inception");
        assert_eq!(query.titles, vec!["Inception".to_string()]);
        assert_eq!(titles(&outcome), vec!["Inception"]);
        assert_eq!(outcome.movies[0].user_rating.map(|r| r.count), Some(3));
    }

    #[test]
    fn test_exact_title_found_among_many_partial_matches() {
        let config = MovieRagConfig::default();
        let store = fixtures::seeded_store_with(|conn| {
            for i in 0..60 {
                conn.execute(
                    "INSERT INTO movies (id, title, year, popularity, vote_average, vote_count) \
                     VALUES (?1, ?2, 2001, 90.0, 6.0, 100)",
                    rusqlite::params![1000 + i, format!("Stand Up Tale {}", i)],
                )
                .unwrap();
            }
            conn.execute(
                "INSERT INTO movies (id, title, year, popularity, vote_average, vote_count) \
                 VALUES (2000, 'Up', 2009, 1.0, 7.9, 9000)",
                [],
            )
            .unwrap();
        });

        let query = QueryAnalyzer::new(&config).analyze(r#"Tell me about "Up""#);
        assert_eq!(query.intent, Intent::Lookup);
        let outcome = RetrievalPlanner::new(&store, &config.retrieval)
            .plan_and_execute(&query)
            .unwrap();
        assert_eq!(titles(&outcome), vec!["Up"]);
    }

    #[test]
    fn test_zero_max_results_still_returns_a_bounded_page() {
        let mut config = MovieRagConfig::default();
        config.retrieval.max_results = 0;
        let store = fixtures::seeded_store();
        let planner = RetrievalPlanner::new(&store, &config.retrieval);
        match planner.plan(&ParsedQuery::new(Intent::TopRated)).unwrap() {
            RetrievalPlan::RatingRanked { filters } => assert_eq!(filters.limit, 1),
            other => panic!("unexpected plan {:?}", other),
        }
    }

    #[test]
    fn test_lookup_partial_match_bounded() {
        let config = MovieRagConfig::default();
        let store = fixtures::seeded_store();
        let planner = RetrievalPlanner::new(&store, &config.retrieval);
        let movies = planner.lookup_title("the", 3).unwrap();
        assert_eq!(movies.len(), 3);
    }

    #[test]
    fn test_lookup_without_title_is_insufficient() {
        let config = MovieRagConfig::default();
        let store = fixtures::seeded_store();
        let planner = RetrievalPlanner::new(&store, &config.retrieval);
        let outcome = planner.plan_and_execute(&ParsedQuery::new(Intent::Lookup)).unwrap();
        assert!(outcome.is_insufficient());
        assert!(outcome.movies.is_empty());
    }

    #[test]
    fn test_unknown_title_is_empty_not_error() {
        let (_, outcome) = run(r#"Tell me about "Zzyzx Road""#);
        assert_eq!(outcome.status, RetrievalStatus::Complete);
        assert!(outcome.movies.is_empty());
    }

    #[test]
    fn test_top_rated_horror_scenario() {
        let (query, outcome) = run("Top 5 highest rated horror movies");
        assert_eq!(query.intent, Intent::TopRated);
        assert_eq!(query.genre.as_deref(), Some("Horror"));
        assert_eq!(query.limit, Some(5));
        assert_eq!(query.sort_hint, Some(SortHint::Descending));

        assert!(outcome.movies.len() <= 5);
        assert!(outcome.movies.iter().all(|m| m.has_genre("Horror")));
        let ratings: Vec<f64> = outcome.movies.iter().filter_map(|m| m.vote_average).collect();
        assert!(ratings.windows(2).all(|w| w[0] >= w[1]));
        // Too few votes to rank.
        assert!(outcome.movies.iter().all(|m| m.title != "Obscure Horror"));
    }

    #[test]
    fn test_worst_rated_sorts_ascending() {
        let (_, outcome) = run("worst horror movies");
        let ratings: Vec<f64> = outcome.movies.iter().filter_map(|m| m.vote_average).collect();
        assert!(ratings.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(outcome.movies[0].title, "It Follows");
    }

    #[test]
    fn test_compare_returns_pair_in_order() {
        let (query, outcome) = run(r#"Compare "The Godfather" and "Goodfellas""#);
        assert_eq!(query.intent, Intent::Compare);
        assert_eq!(titles(&outcome), vec!["The Godfather", "Goodfellas"]);
    }

    #[test]
    fn test_compare_with_one_resolvable_title_is_insufficient() {
        let (_, outcome) = run(r#"Compare "The Godfather" and "Zzyzx Road""#);
        assert!(outcome.is_insufficient());
        assert!(outcome.movies.is_empty());

        let config = MovieRagConfig::default();
        let store = fixtures::seeded_store();
        let mut query = ParsedQuery::new(Intent::Compare);
        query.titles = vec!["Alien".to_string()];
        let outcome = RetrievalPlanner::new(&store, &config.retrieval)
            .plan_and_execute(&query)
            .unwrap();
        assert!(outcome.is_insufficient());
    }

    #[test]
    fn test_recommend_genre_and_decade() {
        let (query, outcome) = run("Recommend sci-fi movies from the 1970s");
        assert_eq!(query.intent, Intent::Recommend);
        assert_eq!((query.year_from, query.year_to), (Some(1970), Some(1979)));
        assert_eq!(titles(&outcome), vec!["Alien"]);
    }

    #[test]
    fn test_recommend_composite_order() {
        let (_, outcome) = run("Recommend some science fiction");
        // Interstellar's popularity is capped at 100 in the blend.
        assert_eq!(outcome.movies[0].title, "Interstellar");
        assert!(outcome.movies.iter().all(|m| m.has_genre("Science Fiction")));
    }

    #[test]
    fn test_recommend_similar_to_borrows_seed_genre() {
        let (_, outcome) = run("Recommend something like Goodfellas");
        assert!(matches!(
            outcome.plan,
            RetrievalPlan::FilteredSearch { ref similar_to, .. } if similar_to.as_deref() == Some("Goodfellas")
        ));
        // Goodfellas is Crime first; the seed itself is excluded.
        assert_eq!(titles(&outcome), vec!["Pulp Fiction", "The Godfather"]);
    }

    #[test]
    fn test_cast_crew_by_title() {
        let (query, outcome) = run("Who directed Inception?");
        assert_eq!(query.intent, Intent::CastCrew);
        assert_eq!(titles(&outcome), vec!["Inception"]);
        assert_eq!(outcome.movies[0].directors, vec!["Christopher Nolan".to_string()]);
        assert_eq!(outcome.movies[0].cast.len(), 4);
    }

    #[test]
    fn test_cast_crew_by_person_newest_first() {
        let (_, outcome) = run("Movies with Tom Hanks");
        assert_eq!(titles(&outcome), vec!["Cast Away", "Saving Private Ryan"]);

        let (_, outcome) = run("Movies directed by Christopher Nolan");
        assert_eq!(titles(&outcome), vec!["Interstellar", "Inception"]);
    }

    #[test]
    fn test_cast_crew_without_title_or_person_is_insufficient() {
        for text in ["Movies with great action", "Recommend movies with great action"] {
            let (query, outcome) = run(text);
            assert_eq!(query.intent, Intent::CastCrew, "{}", text);
            assert!(query.titles.is_empty(), "{}", text);
            assert!(outcome.is_insufficient(), "{}", text);
            assert!(outcome.movies.is_empty());
        }
    }

    #[test]
    fn test_general_skips_store() {
        let (query, outcome) = run("hello");
        assert_eq!(query.intent, Intent::General);
        assert_eq!(outcome.status, RetrievalStatus::NoRetrieval);
        assert_eq!(outcome.plan, RetrievalPlan::NoRetrieval);
        assert!(outcome.movies.is_empty());
    }

    #[test]
    fn test_limits_are_capped() {
        let config = MovieRagConfig::default();
        let store = fixtures::seeded_store();
        let planner = RetrievalPlanner::new(&store, &config.retrieval);
        let mut query = ParsedQuery::new(Intent::TopRated);
        query.limit = Some(10_000);
        match planner.plan(&query).unwrap() {
            RetrievalPlan::RatingRanked { filters } => {
                assert_eq!(filters.limit, config.retrieval.max_results)
            }
            other => panic!("unexpected plan {:?}", other),
        }
    }

    #[test]
    fn test_store_failure_propagates() {
        let config = MovieRagConfig::default();
        let store = fixtures::broken_store();
        let query = QueryAnalyzer::new(&config).analyze("Top 5 horror movies");
        let result = RetrievalPlanner::new(&store, &config.retrieval).plan_and_execute(&query);
        assert!(result.is_err());
    }
}
