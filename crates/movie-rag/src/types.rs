use serde::{Deserialize, Serialize};

/// One credited cast member, in billing order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastMember {
    pub name: String,
    pub character: Option<String>,
}

/// Aggregate of the per-user ratings linked to a movie (0.5 - 5.0 scale).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct UserRatingStats {
    pub mean: f64,
    pub count: u32,
}

/// A movie record as owned by the structured store.
///
/// Search results carry genres, directors and the top-billed cast. Records
/// fetched through `MovieStore::get_movie_detail` additionally carry the full
/// stored cast, financials and user-rating statistics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub year: Option<i32>,
    pub overview: Option<String>,
    pub runtime: Option<f64>,
    /// TMDB vote average on a 0 - 10 scale.
    pub vote_average: Option<f64>,
    pub vote_count: Option<i64>,
    pub popularity: Option<f64>,
    pub release_date: Option<String>,
    pub tagline: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub directors: Vec<String>,
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_rating: Option<UserRatingStats>,
}

impl Movie {
    /// "Title (Year)", or just the title when the year is unknown.
    pub fn display_title(&self) -> String {
        match self.year {
            Some(year) => format!("{} ({})", self.title, year),
            None => self.title.clone(),
        }
    }

    pub fn rating(&self) -> Option<f64> {
        self.vote_average
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g.eq_ignore_ascii_case(genre))
    }
}
