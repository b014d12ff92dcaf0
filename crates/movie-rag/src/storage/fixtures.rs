//! Seeded in-memory catalogues for tests.

use rusqlite::{params, Connection, OpenFlags};

use super::pool::ReadPool;
use super::schema::create_schema;
use super::sqlite_store::SqliteMovieStore;
use crate::rag::parameter_extractor::KNOWN_GENRES;

pub const MOVIE_COUNT: usize = 15;

struct Seed {
    id: i64,
    title: &'static str,
    year: i32,
    vote_average: f64,
    vote_count: i64,
    popularity: f64,
    revenue: Option<i64>,
    genres: &'static [&'static str],
    directors: &'static [&'static str],
    cast: &'static [(&'static str, &'static str)],
}

const SEEDS: [Seed; MOVIE_COUNT] = [
    Seed {
        id: 1, title: "Inception", year: 2010, vote_average: 8.1, vote_count: 14075,
        popularity: 29.1, revenue: Some(825_532_764),
        genres: &["Action", "Science Fiction", "Adventure"],
        directors: &["Christopher Nolan"],
        cast: &[
            ("Leonardo DiCaprio", "Dom Cobb"),
            ("Joseph Gordon-Levitt", "Arthur"),
            ("Ellen Page", "Ariadne"),
            ("Tom Hardy", "Eames"),
        ],
    },
    Seed {
        id: 2, title: "The Godfather", year: 1972, vote_average: 8.5, vote_count: 6024,
        popularity: 41.1, revenue: Some(245_066_411),
        genres: &["Drama", "Crime"],
        directors: &["Francis Ford Coppola"],
        cast: &[("Marlon Brando", "Don Vito Corleone"), ("Al Pacino", "Michael Corleone")],
    },
    Seed {
        id: 3, title: "Goodfellas", year: 1990, vote_average: 8.2, vote_count: 3211,
        popularity: 15.4, revenue: Some(46_836_394),
        genres: &["Drama", "Crime"],
        directors: &["Martin Scorsese"],
        cast: &[("Robert De Niro", "James Conway"), ("Ray Liotta", "Henry Hill")],
    },
    Seed {
        id: 4, title: "Alien", year: 1979, vote_average: 7.9, vote_count: 4470,
        popularity: 23.4, revenue: Some(104_931_801),
        genres: &["Horror", "Science Fiction"],
        directors: &["Ridley Scott"],
        cast: &[("Sigourney Weaver", "Ellen Ripley"), ("Tom Skerritt", "Dallas")],
    },
    Seed {
        id: 5, title: "Aliens", year: 1986, vote_average: 7.7, vote_count: 3282,
        popularity: 21.8, revenue: Some(183_316_455),
        genres: &["Horror", "Action", "Thriller", "Science Fiction"],
        directors: &["James Cameron"],
        cast: &[("Sigourney Weaver", "Ellen Ripley"), ("Michael Biehn", "Hicks")],
    },
    Seed {
        id: 6, title: "The Matrix", year: 1999, vote_average: 7.9, vote_count: 9079,
        popularity: 33.4, revenue: Some(463_517_383),
        genres: &["Action", "Science Fiction"],
        directors: &["Lana Wachowski", "Lilly Wachowski"],
        cast: &[("Keanu Reeves", "Neo"), ("Laurence Fishburne", "Morpheus")],
    },
    Seed {
        id: 7, title: "Pulp Fiction", year: 1994, vote_average: 8.3, vote_count: 8670,
        popularity: 140.9, revenue: Some(213_928_762),
        genres: &["Thriller", "Crime"],
        directors: &["Quentin Tarantino"],
        cast: &[("John Travolta", "Vincent Vega"), ("Samuel L. Jackson", "Jules Winnfield")],
    },
    Seed {
        id: 8, title: "Interstellar", year: 2014, vote_average: 8.1, vote_count: 11187,
        popularity: 724.2, revenue: Some(675_120_017),
        genres: &["Adventure", "Drama", "Science Fiction"],
        directors: &["Christopher Nolan"],
        cast: &[("Matthew McConaughey", "Cooper"), ("Jessica Chastain", "Murph")],
    },
    Seed {
        id: 9, title: "The Shining", year: 1980, vote_average: 8.1, vote_count: 3890,
        popularity: 19.6, revenue: Some(44_017_374),
        genres: &["Horror", "Thriller"],
        directors: &["Stanley Kubrick"],
        cast: &[("Jack Nicholson", "Jack Torrance"), ("Shelley Duvall", "Wendy Torrance")],
    },
    Seed {
        id: 10, title: "Get Out", year: 2017, vote_average: 7.4, vote_count: 7130,
        popularity: 40.0, revenue: Some(252_434_250),
        genres: &["Horror", "Mystery", "Thriller"],
        directors: &["Jordan Peele"],
        cast: &[("Daniel Kaluuya", "Chris Washington"), ("Allison Williams", "Rose Armitage")],
    },
    Seed {
        id: 11, title: "Hereditary", year: 2018, vote_average: 7.3, vote_count: 2800,
        popularity: 25.0, revenue: Some(79_336_369),
        genres: &["Horror", "Mystery"],
        directors: &["Ari Aster"],
        cast: &[("Toni Collette", "Annie Graham"), ("Alex Wolff", "Peter Graham")],
    },
    Seed {
        id: 12, title: "It Follows", year: 2014, vote_average: 6.6, vote_count: 2451,
        popularity: 14.0, revenue: Some(23_300_000),
        genres: &["Horror", "Thriller"],
        directors: &["David Robert Mitchell"],
        cast: &[("Maika Monroe", "Jay Height")],
    },
    Seed {
        id: 13, title: "Obscure Horror", year: 2015, vote_average: 9.5, vote_count: 3,
        popularity: 0.5, revenue: None,
        genres: &["Horror"],
        directors: &["Nobody Known"],
        cast: &[],
    },
    Seed {
        id: 14, title: "Cast Away", year: 2000, vote_average: 7.5, vote_count: 5000,
        popularity: 30.0, revenue: Some(429_632_142),
        genres: &["Adventure", "Drama"],
        directors: &["Robert Zemeckis"],
        cast: &[("Tom Hanks", "Chuck Noland"), ("Helen Hunt", "Kelly Frears")],
    },
    Seed {
        id: 15, title: "Saving Private Ryan", year: 1998, vote_average: 7.9, vote_count: 9000,
        popularity: 35.0, revenue: Some(481_840_909),
        genres: &["Drama", "History", "War"],
        directors: &["Steven Spielberg"],
        cast: &[("Tom Hanks", "Captain John H. Miller"), ("Matt Damon", "Private James Ryan")],
    },
];

/// (movie_id, user_id, rating) rows.
const RATINGS: &[(i64, i64, f64)] = &[
    (1, 1, 4.5), (1, 2, 5.0), (1, 3, 4.0),
    (2, 1, 5.0), (2, 2, 4.5),
];

fn shared_memory_uri() -> String {
    format!(
        "file:movies_{}?mode=memory&cache=shared",
        uuid::Uuid::new_v4().simple()
    )
}

fn open_owner(uri: &str) -> Connection {
    Connection::open_with_flags(
        uri,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE | OpenFlags::SQLITE_OPEN_URI,
    )
    .expect("open shared in-memory catalogue")
}

fn seed(conn: &Connection) {
    create_schema(conn).expect("create schema");

    for (idx, name) in KNOWN_GENRES.iter().enumerate() {
        conn.execute("INSERT INTO genres (id, name) VALUES (?1, ?2)", params![idx as i64 + 1, name])
            .expect("insert genre");
    }

    for movie in &SEEDS {
        conn.execute(
            "INSERT INTO movies (id, title, year, overview, runtime, revenue, popularity, \
             vote_average, vote_count, original_language, status, release_date) \
             VALUES (?1, ?2, ?3, ?4, 120.0, ?5, ?6, ?7, ?8, 'en', 'Released', ?9)",
            params![
                movie.id,
                movie.title,
                movie.year,
                format!("Overview of {}.", movie.title),
                movie.revenue,
                movie.popularity,
                movie.vote_average,
                movie.vote_count,
                format!("{}-01-01", movie.year),
            ],
        )
        .expect("insert movie");

        for genre in movie.genres {
            conn.execute(
                "INSERT INTO movie_genres (movie_id, genre_id) \
                 SELECT ?1, id FROM genres WHERE name = ?2",
                params![movie.id, genre],
            )
            .expect("insert movie genre");
        }
        for director in movie.directors {
            conn.execute(
                "INSERT INTO directors (movie_id, name) VALUES (?1, ?2)",
                params![movie.id, director],
            )
            .expect("insert director");
        }
        for (order, (name, character)) in movie.cast.iter().enumerate() {
            conn.execute(
                "INSERT INTO cast_members (movie_id, name, character, cast_order) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![movie.id, name, character, order as i64],
            )
            .expect("insert cast member");
        }
    }

    for (movie_id, user_id, rating) in RATINGS {
        conn.execute(
            "INSERT INTO ratings (movie_id, user_id, rating, timestamp) VALUES (?1, ?2, ?3, 0)",
            params![movie_id, user_id, rating],
        )
        .expect("insert rating");
    }
}

/// A catalogue holding the fifteen seed movies.
pub fn seeded_store() -> SqliteMovieStore {
    seeded_store_with(|_| {})
}

/// The seed catalogue plus whatever rows `extra` inserts.
pub fn seeded_store_with<F: FnOnce(&Connection)>(extra: F) -> SqliteMovieStore {
    let uri = shared_memory_uri();
    let owner = open_owner(&uri);
    seed(&owner);
    extra(&owner);
    let pool = ReadPool::open_uri(&uri, 2).expect("open read pool");
    SqliteMovieStore::with_keepalive(pool, owner)
}

/// A catalogue with no tables: every query fails.
pub fn broken_store() -> SqliteMovieStore {
    let uri = shared_memory_uri();
    let owner = open_owner(&uri);
    let pool = ReadPool::open_uri(&uri, 1).expect("open read pool");
    SqliteMovieStore::with_keepalive(pool, owner)
}
