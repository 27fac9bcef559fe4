//! Wire shapes for the TMDB v3 endpoints the pipeline touches.
//!
//! Everything optional upstream is defaulted here so a sparse record decodes
//! instead of failing the whole page.

use chrono::{DateTime, NaiveDate, Utc};
use marquee_model::{
    CreditId, CreditKind, Genre, GenreId, Image, ImageKind, MovieDetails,
    MovieId, MovieSummary, Person, PersonId,
};
use serde::Deserialize;

fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
}

fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_date))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverPage<T> {
    pub page: u32,
    pub results: Vec<T>,
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

/// One entry of `/discover/movie`.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverMovie {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub original_title: String,
    #[serde(default)]
    pub original_language: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub adult: bool,
    #[serde(default)]
    pub video: bool,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: i64,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
}

impl DiscoverMovie {
    pub fn to_summary(&self) -> MovieSummary {
        MovieSummary {
            id: MovieId(self.id),
            title: self.title.clone(),
            original_title: self.original_title.clone(),
            original_language: self.original_language.clone(),
            overview: self.overview.clone(),
            poster_path: non_empty(self.poster_path.clone()),
            backdrop_path: non_empty(self.backdrop_path.clone()),
            release_date: self.release_date,
            adult: self.adult,
            video: self.video,
            popularity: self.popularity,
            vote_average: self.vote_average,
            vote_count: self.vote_count,
        }
    }

    /// Genre ids in source order with repeats removed.
    pub fn genre_set(&self) -> Vec<GenreId> {
        let mut seen = Vec::with_capacity(self.genre_ids.len());
        for id in &self.genre_ids {
            let id = GenreId(*id);
            if !seen.contains(&id) {
                seen.push(id);
            }
        }
        seen
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenreList {
    #[serde(default)]
    pub genres: Vec<GenreEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenreEntry {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

impl From<GenreEntry> for Genre {
    fn from(entry: GenreEntry) -> Self {
        Genre {
            id: GenreId(entry.id),
            name: entry.name,
        }
    }
}

/// `/movie/{id}`, reduced to the fields discovery does not carry.
#[derive(Debug, Clone, Deserialize)]
pub struct MovieDetailsResponse {
    pub id: i64,
    #[serde(default)]
    pub runtime: Option<i32>,
    #[serde(default)]
    pub budget: Option<i64>,
    #[serde(default)]
    pub revenue: Option<i64>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl MovieDetailsResponse {
    pub fn into_details(self, fetched_at: DateTime<Utc>) -> MovieDetails {
        MovieDetails {
            // TMDB reports 0 for unknown runtimes and money figures.
            runtime: self.runtime.filter(|r| *r > 0),
            budget: self.budget.filter(|b| *b > 0),
            revenue: self.revenue.filter(|r| *r > 0),
            homepage: non_empty(self.homepage),
            imdb_id: non_empty(self.imdb_id),
            tagline: non_empty(self.tagline),
            status: non_empty(self.status),
            fetched_at,
        }
    }
}

/// `/movie/{id}/credits`. Only the ids are needed; detail comes per credit.
#[derive(Debug, Clone, Deserialize)]
pub struct MovieCredits {
    #[serde(default)]
    pub cast: Vec<CreditEntry>,
    #[serde(default)]
    pub crew: Vec<CreditEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreditEntry {
    pub credit_id: String,
    /// Person id.
    pub id: i64,
}

/// `/credit/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreditDetails {
    pub id: String,
    pub credit_type: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub job: String,
    #[serde(default)]
    pub media: CreditMedia,
    pub person: CreditPerson,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreditMedia {
    #[serde(default)]
    pub character: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreditPerson {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

impl CreditDetails {
    pub fn person_id(&self) -> PersonId {
        PersonId(self.person.id)
    }

    /// Credit type as reported, falling back to the list it came from.
    pub fn kind_or(&self, fallback: CreditKind) -> CreditKind {
        self.credit_type.parse().unwrap_or(fallback)
    }

    pub fn into_credit(
        self,
        movie_id: MovieId,
        fallback: CreditKind,
        order: i32,
    ) -> marquee_model::Credit {
        let kind = self.kind_or(fallback);
        marquee_model::Credit {
            id: CreditId::new(self.id),
            movie_id,
            person_id: PersonId(self.person.id),
            kind,
            department: self.department,
            job: self.job,
            character: non_empty(self.media.character),
            order,
        }
    }
}

/// `/person/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct PersonResponse {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub gender: i32,
    #[serde(default)]
    pub adult: bool,
    #[serde(default)]
    pub known_for_department: Option<String>,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub also_known_as: Vec<String>,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub birthday: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub deathday: Option<NaiveDate>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub place_of_birth: Option<String>,
}

impl From<PersonResponse> for Person {
    fn from(p: PersonResponse) -> Self {
        Person {
            id: PersonId(p.id),
            name: p.name,
            original_name: non_empty(p.original_name),
            gender: p.gender,
            adult: p.adult,
            known_for_department: non_empty(p.known_for_department),
            popularity: p.popularity,
            profile_path: non_empty(p.profile_path),
            also_known_as: p.also_known_as,
            biography: non_empty(p.biography),
            birthday: p.birthday,
            deathday: p.deathday,
            homepage: non_empty(p.homepage),
            place_of_birth: non_empty(p.place_of_birth),
        }
    }
}

/// `/movie/{id}/images`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieImages {
    #[serde(default)]
    pub backdrops: Vec<ImageEntry>,
    #[serde(default)]
    pub posters: Vec<ImageEntry>,
    #[serde(default)]
    pub logos: Vec<ImageEntry>,
}

impl MovieImages {
    pub fn of_kind(&self, kind: ImageKind) -> &[ImageEntry] {
        match kind {
            ImageKind::Backdrop => &self.backdrops,
            ImageKind::Poster => &self.posters,
            ImageKind::Logo => &self.logos,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageEntry {
    pub file_path: String,
    #[serde(default)]
    pub width: i32,
    #[serde(default)]
    pub height: i32,
    #[serde(default)]
    pub aspect_ratio: f64,
    #[serde(default)]
    pub iso_639_1: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: i64,
}

impl ImageEntry {
    pub fn to_image(&self, kind: ImageKind) -> Image {
        Image {
            file_path: self.file_path.clone(),
            kind,
            width: self.width,
            height: self.height,
            aspect_ratio: self.aspect_ratio,
            language: non_empty(self.iso_639_1.clone()),
            vote_average: self.vote_average,
            vote_count: self.vote_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discover_entry_tolerates_nulls_and_empty_dates() {
        let raw = r#"{
            "id": 603,
            "title": "黑客帝国",
            "original_title": "The Matrix",
            "poster_path": null,
            "release_date": "",
            "genre_ids": [28, 878, 28]
        }"#;
        let movie: DiscoverMovie = serde_json::from_str(raw).unwrap();

        assert_eq!(movie.release_date, None);
        assert_eq!(movie.genre_set(), vec![GenreId(28), GenreId(878)]);
        let summary = movie.to_summary();
        assert_eq!(summary.id, MovieId(603));
        assert_eq!(summary.poster_path, None);
    }

    #[test]
    fn zero_runtime_is_treated_as_unknown() {
        let raw = r#"{"id": 1, "runtime": 0, "budget": 0, "imdb_id": ""}"#;
        let details: MovieDetailsResponse = serde_json::from_str(raw).unwrap();
        let details = details.into_details(Utc::now());
        assert_eq!(details.runtime, None);
        assert_eq!(details.budget, None);
        assert_eq!(details.imdb_id, None);
    }

    #[test]
    fn credit_details_map_to_credit_row() {
        let raw = r#"{
            "id": "52fe4250c3a36847f80149f3",
            "credit_type": "cast",
            "department": "Acting",
            "job": "Actor",
            "media": {"character": "Neo"},
            "person": {"id": 6384, "name": "Keanu Reeves"}
        }"#;
        let details: CreditDetails = serde_json::from_str(raw).unwrap();
        let credit = details.into_credit(MovieId(603), CreditKind::Crew, 0);

        assert_eq!(credit.kind, CreditKind::Cast);
        assert_eq!(credit.person_id, PersonId(6384));
        assert_eq!(credit.character.as_deref(), Some("Neo"));
        assert_eq!(credit.id.as_str(), "52fe4250c3a36847f80149f3");
    }

    #[test]
    fn unknown_credit_type_falls_back_to_source_list() {
        let raw = r#"{
            "id": "x",
            "credit_type": "guest",
            "person": {"id": 1}
        }"#;
        let details: CreditDetails = serde_json::from_str(raw).unwrap();
        assert_eq!(details.kind_or(CreditKind::Crew), CreditKind::Crew);
    }

    #[test]
    fn person_birthday_parses() {
        let raw = r#"{
            "id": 6384,
            "name": "Keanu Reeves",
            "birthday": "1964-09-02",
            "deathday": null,
            "also_known_as": ["基努·里维斯"]
        }"#;
        let person: Person =
            serde_json::from_str::<PersonResponse>(raw).unwrap().into();
        assert_eq!(person.birthday, NaiveDate::from_ymd_opt(1964, 9, 2));
        assert_eq!(person.deathday, None);
        assert_eq!(person.also_known_as.len(), 1);
    }
}
