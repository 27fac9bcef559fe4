use chrono::{DateTime, NaiveDate, Utc};

use crate::ids::MovieId;

/// Locally stored movie row.
///
/// Summary fields come from discovery pages and are refreshed on every sync.
/// Detail fields are filled once by the supplemental detail fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub original_title: String,
    pub original_language: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub adult: bool,
    pub video: bool,
    pub popularity: f64,
    pub vote_average: f64,
    pub vote_count: i64,
    pub runtime: Option<i32>,
    pub budget: Option<i64>,
    pub revenue: Option<i64>,
    pub homepage: Option<String>,
    pub imdb_id: Option<String>,
    pub tagline: Option<String>,
    pub status: Option<String>,
    pub details_fetched_at: Option<DateTime<Utc>>,
}

impl Movie {
    /// Build a fresh row from summary data; detail fields start empty.
    pub fn from_summary(summary: MovieSummary) -> Self {
        Self {
            id: summary.id,
            title: summary.title,
            original_title: summary.original_title,
            original_language: summary.original_language,
            overview: summary.overview,
            poster_path: summary.poster_path,
            backdrop_path: summary.backdrop_path,
            release_date: summary.release_date,
            adult: summary.adult,
            video: summary.video,
            popularity: summary.popularity,
            vote_average: summary.vote_average,
            vote_count: summary.vote_count,
            runtime: None,
            budget: None,
            revenue: None,
            homepage: None,
            imdb_id: None,
            tagline: None,
            status: None,
            details_fetched_at: None,
        }
    }

    /// True while the one-off detail fetch still has to happen.
    pub fn needs_details(&self) -> bool {
        self.runtime.is_none() && self.details_fetched_at.is_none()
    }

    pub fn apply_summary(&mut self, summary: &MovieSummary) {
        self.title.clone_from(&summary.title);
        self.original_title.clone_from(&summary.original_title);
        self.original_language.clone_from(&summary.original_language);
        self.overview.clone_from(&summary.overview);
        self.poster_path.clone_from(&summary.poster_path);
        self.backdrop_path.clone_from(&summary.backdrop_path);
        self.release_date = summary.release_date;
        self.adult = summary.adult;
        self.video = summary.video;
        self.popularity = summary.popularity;
        self.vote_average = summary.vote_average;
        self.vote_count = summary.vote_count;
    }

    pub fn apply_details(&mut self, details: &MovieDetails) {
        self.runtime = details.runtime;
        self.budget = details.budget;
        self.revenue = details.revenue;
        self.homepage.clone_from(&details.homepage);
        self.imdb_id.clone_from(&details.imdb_id);
        self.tagline.clone_from(&details.tagline);
        self.status.clone_from(&details.status);
        self.details_fetched_at = Some(details.fetched_at);
    }
}

/// Fields carried by a discovery page entry.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieSummary {
    pub id: MovieId,
    pub title: String,
    pub original_title: String,
    pub original_language: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub adult: bool,
    pub video: bool,
    pub popularity: f64,
    pub vote_average: f64,
    pub vote_count: i64,
}

/// Fields only available from the per-movie detail endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieDetails {
    pub runtime: Option<i32>,
    pub budget: Option<i64>,
    pub revenue: Option<i64>,
    pub homepage: Option<String>,
    pub imdb_id: Option<String>,
    pub tagline: Option<String>,
    pub status: Option<String>,
    pub fetched_at: DateTime<Utc>,
}
