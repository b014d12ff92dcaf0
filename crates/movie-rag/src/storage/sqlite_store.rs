//! SQLite-backed `MovieStore`.

use parking_lot::Mutex;
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, Row};

use super::pool::ReadPool;
use super::{MovieFilters, MovieStore, SortKey};
use crate::config::DatabaseConfig;
use crate::error::StoreResult;
use crate::types::{CastMember, Movie, UserRatingStats};

/// Upper bound on a single page, whatever the caller asks for.
const MAX_PAGE_SIZE: usize = 100;
/// Cast members attached to search results.
const SEARCH_CAST_LIMIT: usize = 5;
/// Cast members attached to a full detail record.
const DETAIL_CAST_LIMIT: usize = 10;

const SEARCH_COLUMNS: &str = "m.id, m.title, m.year, m.overview, m.runtime, m.vote_average, \
     m.vote_count, m.popularity, m.release_date, m.tagline";

const DETAIL_COLUMNS: &str = "m.id, m.title, m.year, m.overview, m.runtime, m.vote_average, \
     m.vote_count, m.popularity, m.release_date, m.tagline, m.budget, m.revenue, \
     m.original_language, m.status";

pub struct SqliteMovieStore {
    pool: ReadPool,
    // Keeps a shared in-memory catalogue alive for the store's lifetime.
    _keepalive: Option<Mutex<Connection>>,
}

impl SqliteMovieStore {
    /// Open the catalogue file named in the config, read-only.
    pub fn open(config: &DatabaseConfig) -> StoreResult<Self> {
        let pool = ReadPool::open(&config.path, config.read_pool_size)?;
        tracing::info!(
            path = %config.path.display(),
            connections = pool.size(),
            "Opened movie catalogue"
        );
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: ReadPool) -> Self {
        Self {
            pool,
            _keepalive: None,
        }
    }

    /// Store over a shared-cache in-memory database, kept alive by `owner`.
    pub fn with_keepalive(pool: ReadPool, owner: Connection) -> Self {
        Self {
            pool,
            _keepalive: Some(Mutex::new(owner)),
        }
    }
}

impl MovieStore for SqliteMovieStore {
    fn search_movies(&self, filters: &MovieFilters) -> StoreResult<Vec<Movie>> {
        let (sql, params) = build_search_query(filters);
        tracing::debug!(sort = ?filters.sort, limit = filters.limit, "search_movies");

        self.pool.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
            let rows = stmt.query_map(param_refs.as_slice(), parse_search_row)?;

            let mut movies = Vec::new();
            for row in rows {
                let mut movie = row?;
                enrich(conn, &mut movie, SEARCH_CAST_LIMIT)?;
                movies.push(movie);
            }
            Ok(movies)
        })
    }

    fn get_movie_detail(&self, id: i64) -> StoreResult<Option<Movie>> {
        self.pool.with_conn(|conn| {
            let sql = format!("SELECT {DETAIL_COLUMNS} FROM movies m WHERE m.id = ?1");
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params![id])?;
            let Some(row) = rows.next()? else {
                return Ok(None);
            };

            let mut movie = parse_search_row(row)?;
            movie.budget = row.get(10)?;
            movie.revenue = row.get(11)?;
            movie.original_language = row.get(12)?;
            movie.status = row.get(13)?;

            enrich(conn, &mut movie, DETAIL_CAST_LIMIT)?;
            movie.user_rating = user_rating_stats(conn, id)?;
            Ok(Some(movie))
        })
    }

    fn list_genres(&self) -> StoreResult<Vec<String>> {
        self.pool.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT name FROM genres ORDER BY name")?;
            let names = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(names)
        })
    }

    fn health_check(&self) -> bool {
        let result = self.pool.with_conn(|conn| {
            conn.query_row("SELECT 1 FROM movies LIMIT 1", [], |_| Ok(()))
                .or_else(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => Ok(()),
                    other => Err(other),
                })?;
            Ok(())
        });
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Movie catalogue health check failed");
                false
            }
        }
    }
}

/// Build the filtered search statement and its bound parameters.
fn build_search_query(filters: &MovieFilters) -> (String, Vec<Box<dyn ToSql>>) {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<Box<dyn ToSql>> = Vec::new();

    let mut bind = |clause: &str, value: Box<dyn ToSql>, params: &mut Vec<Box<dyn ToSql>>| {
        params.push(value);
        clauses.push(clause.replace('?', &format!("?{}", params.len())));
    };

    if let Some(title) = non_blank(&filters.title) {
        bind("m.title LIKE ? ESCAPE '\\'", Box::new(like_pattern(title)), &mut params);
    }
    if let Some(title) = non_blank(&filters.exact_title) {
        bind("lower(trim(m.title)) = lower(?)", Box::new(title.trim().to_string()), &mut params);
    }
    if let Some(genre) = non_blank(&filters.genre) {
        bind(
            "m.id IN (SELECT mg.movie_id FROM movie_genres mg \
             JOIN genres g ON g.id = mg.genre_id WHERE g.name LIKE ? ESCAPE '\\')",
            Box::new(like_pattern(genre)),
            &mut params,
        );
    }
    if let Some(year) = filters.year {
        bind("m.year = ?", Box::new(year), &mut params);
    }
    if let Some(from) = filters.year_from {
        bind("m.year >= ?", Box::new(from), &mut params);
    }
    if let Some(to) = filters.year_to {
        bind("m.year <= ?", Box::new(to), &mut params);
    }
    if let Some(director) = non_blank(&filters.director) {
        bind(
            "m.id IN (SELECT d.movie_id FROM directors d WHERE d.name LIKE ? ESCAPE '\\')",
            Box::new(like_pattern(director)),
            &mut params,
        );
    }
    if let Some(actor) = non_blank(&filters.actor) {
        bind(
            "m.id IN (SELECT c.movie_id FROM cast_members c WHERE c.name LIKE ? ESCAPE '\\')",
            Box::new(like_pattern(actor)),
            &mut params,
        );
    }
    if let Some(min_votes) = filters.min_votes {
        bind("m.vote_count >= ?", Box::new(min_votes), &mut params);
    }
    if let Some(exclude) = filters.exclude_id {
        bind("m.id != ?", Box::new(exclude), &mut params);
    }
    if filters.sort == SortKey::Rating {
        clauses.push("m.vote_average IS NOT NULL".to_string());
    }

    let where_clause = if clauses.is_empty() {
        "1=1".to_string()
    } else {
        clauses.join(" AND ")
    };

    let limit = filters.limit.min(MAX_PAGE_SIZE) as i64;
    let offset = filters.offset as i64;
    params.push(Box::new(limit));
    let limit_idx = params.len();
    params.push(Box::new(offset));
    let offset_idx = params.len();

    let sql = format!(
        "SELECT {SEARCH_COLUMNS} FROM movies m WHERE {where_clause} \
         ORDER BY {order} LIMIT ?{limit_idx} OFFSET ?{offset_idx}",
        order = order_by(filters),
    );
    (sql, params)
}

/// ORDER BY clause. Missing values always sort last; ties fall back to id.
fn order_by(filters: &MovieFilters) -> String {
    let dir = filters.direction().as_sql();
    match filters.sort {
        SortKey::Popularity => format!("(m.popularity IS NULL), m.popularity {dir}, m.id ASC"),
        SortKey::Rating => format!("m.vote_average {dir}, m.vote_count DESC, m.id ASC"),
        SortKey::Year => format!("(m.year IS NULL), m.year {dir}, m.id ASC"),
        SortKey::Title => format!("m.title COLLATE NOCASE {dir}, m.id ASC"),
        SortKey::Revenue => format!("(m.revenue IS NULL), m.revenue {dir}, m.id ASC"),
        SortKey::Composite => format!(
            "((COALESCE(m.vote_average, 0) * 0.7) + \
             (MIN(COALESCE(m.popularity, 0), 100.0) / 10.0 * 0.3)) {dir}, m.id ASC"
        ),
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// `%value%` with LIKE wildcards in the value escaped.
fn like_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn parse_search_row(row: &Row<'_>) -> rusqlite::Result<Movie> {
    Ok(Movie {
        id: row.get(0)?,
        title: row.get(1)?,
        year: row.get(2)?,
        overview: row.get(3)?,
        runtime: row.get(4)?,
        vote_average: row.get(5)?,
        vote_count: row.get(6)?,
        popularity: row.get(7)?,
        release_date: row.get(8)?,
        tagline: row.get(9)?,
        genres: Vec::new(),
        directors: Vec::new(),
        cast: Vec::new(),
        budget: None,
        revenue: None,
        original_language: None,
        status: None,
        user_rating: None,
    })
}

/// Attach genres, directors and the top-billed cast.
fn enrich(conn: &Connection, movie: &mut Movie, cast_limit: usize) -> StoreResult<()> {
    let mut stmt = conn.prepare_cached(
        "SELECT g.name FROM genres g JOIN movie_genres mg ON g.id = mg.genre_id \
         WHERE mg.movie_id = ?1 ORDER BY g.id",
    )?;
    movie.genres = stmt
        .query_map(params![movie.id], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;

    let mut stmt =
        conn.prepare_cached("SELECT name FROM directors WHERE movie_id = ?1 ORDER BY id")?;
    movie.directors = stmt
        .query_map(params![movie.id], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;

    let mut stmt = conn.prepare_cached(
        "SELECT name, character FROM cast_members WHERE movie_id = ?1 \
         ORDER BY (cast_order IS NULL), cast_order, id LIMIT ?2",
    )?;
    movie.cast = stmt
        .query_map(params![movie.id, cast_limit as i64], |row| {
            Ok(CastMember {
                name: row.get(0)?,
                character: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(())
}

fn user_rating_stats(conn: &Connection, movie_id: i64) -> StoreResult<Option<UserRatingStats>> {
    let (mean, count): (Option<f64>, i64) = conn.query_row(
        "SELECT AVG(rating), COUNT(*) FROM ratings WHERE movie_id = ?1",
        params![movie_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok(match mean {
        Some(mean) if count > 0 => Some(UserRatingStats {
            mean: (mean * 100.0).round() / 100.0,
            count: count as u32,
        }),
        _ => None,
    })
}
