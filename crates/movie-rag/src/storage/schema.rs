//! Catalogue schema (TMDB movie metadata plus MovieLens-style user ratings).

use rusqlite::Connection;

use crate::error::StoreResult;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS movies (
    id                INTEGER PRIMARY KEY,
    title             TEXT NOT NULL,
    year              INTEGER,
    overview          TEXT,
    runtime           REAL,
    budget            INTEGER,
    revenue           INTEGER,
    popularity        REAL,
    vote_average      REAL,
    vote_count        INTEGER,
    original_language TEXT,
    tagline           TEXT,
    status            TEXT,
    release_date      TEXT
);

CREATE TABLE IF NOT EXISTS genres (
    id   INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS movie_genres (
    movie_id INTEGER NOT NULL REFERENCES movies(id),
    genre_id INTEGER NOT NULL REFERENCES genres(id),
    PRIMARY KEY (movie_id, genre_id)
);

CREATE TABLE IF NOT EXISTS cast_members (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    movie_id   INTEGER NOT NULL REFERENCES movies(id),
    name       TEXT NOT NULL,
    character  TEXT,
    cast_order INTEGER
);

CREATE TABLE IF NOT EXISTS directors (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    movie_id INTEGER NOT NULL REFERENCES movies(id),
    name     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS ratings (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    movie_id  INTEGER NOT NULL REFERENCES movies(id),
    user_id   INTEGER NOT NULL,
    rating    REAL NOT NULL,
    timestamp INTEGER
);

CREATE INDEX IF NOT EXISTS idx_movies_title      ON movies(title);
CREATE INDEX IF NOT EXISTS idx_movie_genres_genre ON movie_genres(genre_id);
CREATE INDEX IF NOT EXISTS idx_cast_members_movie ON cast_members(movie_id);
CREATE INDEX IF NOT EXISTS idx_directors_movie    ON directors(movie_id);
CREATE INDEX IF NOT EXISTS idx_ratings_movie      ON ratings(movie_id);
";

/// Create all catalogue tables on a writable connection.
pub fn create_schema(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}
