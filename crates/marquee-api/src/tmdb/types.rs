use serde::{Deserialize, Serialize};

use marquee_core::models::{MovieDetails, MovieId, MovieSummary};

// ── TMDB wire types (snake_case, as the API emits them) ──────────

/// One record from `/search/movie`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbMovieSearchResult {
    pub id: MovieId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

/// Response body of `/movie/{id}`, reduced to the fields we show.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbMovieDetails {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

/// Error payload TMDB returns with non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct TmdbErrorBody {
    pub status_message: Option<String>,
}

// ── Conversions ──────────────────────────────────────────────────

impl TmdbMovieSearchResult {
    pub fn into_summary(self) -> MovieSummary {
        MovieSummary {
            id: self.id,
            title: self.title.unwrap_or_default(),
            overview: self.overview.unwrap_or_default(),
            release_date: self.release_date,
            poster_path: self.poster_path,
        }
    }
}

impl From<TmdbMovieDetails> for MovieDetails {
    fn from(d: TmdbMovieDetails) -> Self {
        MovieDetails {
            id: d.id,
            title: d.title,
            overview: d.overview.unwrap_or_default(),
            release_date: d.release_date,
            runtime: d.runtime,
            poster_path: d.poster_path,
        }
    }
}
