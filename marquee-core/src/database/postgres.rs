use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use marquee_model::{
    AssetRef, Credit, CreditId, Genre, GenreId, Image, Movie, MovieDetails,
    MovieId, MovieSummary, Person, PersonId,
};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::{debug, info};

use crate::database::ports::{
    CreditRepository, FindOrCreate, GenreRepository, ImageRepository,
    MovieRepository, PeopleRepository,
};
use crate::error::{Result, SyncError};

/// Schema migrations bundled with the crate.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// PostgreSQL adapter for every catalog port.
///
/// Each write is one statement; creates use `ON CONFLICT DO NOTHING` so
/// concurrent or repeated runs never produce duplicates.
#[derive(Clone, Debug)]
pub struct PostgresCatalog {
    pool: PgPool,
}

impl PostgresCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await?;
        info!("catalog migrations applied");
        Ok(())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MovieRow {
    id: MovieId,
    title: String,
    original_title: String,
    original_language: String,
    overview: String,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    release_date: Option<NaiveDate>,
    adult: bool,
    video: bool,
    popularity: f64,
    vote_average: f64,
    vote_count: i64,
    runtime: Option<i32>,
    budget: Option<i64>,
    revenue: Option<i64>,
    homepage: Option<String>,
    imdb_id: Option<String>,
    tagline: Option<String>,
    status: Option<String>,
    details_fetched_at: Option<DateTime<Utc>>,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Movie {
            id: row.id,
            title: row.title,
            original_title: row.original_title,
            original_language: row.original_language,
            overview: row.overview,
            poster_path: row.poster_path,
            backdrop_path: row.backdrop_path,
            release_date: row.release_date,
            adult: row.adult,
            video: row.video,
            popularity: row.popularity,
            vote_average: row.vote_average,
            vote_count: row.vote_count,
            runtime: row.runtime,
            budget: row.budget,
            revenue: row.revenue,
            homepage: row.homepage,
            imdb_id: row.imdb_id,
            tagline: row.tagline,
            status: row.status,
            details_fetched_at: row.details_fetched_at,
        }
    }
}

const MOVIE_COLUMNS: &str = "id, title, original_title, original_language, \
    overview, poster_path, backdrop_path, release_date, adult, video, \
    popularity, vote_average, vote_count, runtime, budget, revenue, \
    homepage, imdb_id, tagline, status, details_fetched_at";

#[async_trait]
impl MovieRepository for PostgresCatalog {
    async fn find_movie(&self, id: MovieId) -> Result<Option<Movie>> {
        let row: Option<MovieRow> = sqlx::query_as(&format!(
            "SELECT {MOVIE_COLUMNS} FROM movies WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Movie::from))
    }

    async fn find_or_create_movie(
        &self,
        movie: &Movie,
    ) -> Result<FindOrCreate<Movie>> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO movies (
                id, title, original_title, original_language, overview,
                poster_path, backdrop_path, release_date, adult, video,
                popularity, vote_average, vote_count
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(movie.id)
        .bind(&movie.title)
        .bind(&movie.original_title)
        .bind(&movie.original_language)
        .bind(&movie.overview)
        .bind(&movie.poster_path)
        .bind(&movie.backdrop_path)
        .bind(movie.release_date)
        .bind(movie.adult)
        .bind(movie.video)
        .bind(movie.popularity)
        .bind(movie.vote_average)
        .bind(movie.vote_count)
        .execute(&self.pool)
        .await?
        .rows_affected()
            > 0;

        let stored = self.find_movie(movie.id).await?.ok_or_else(|| {
            SyncError::Storage(format!("movie {} vanished after insert", movie.id))
        })?;

        if inserted {
            debug!(movie_id = %movie.id, "movie row created");
            Ok(FindOrCreate::Created(stored))
        } else {
            Ok(FindOrCreate::Existing(stored))
        }
    }

    async fn update_movie_summary(&self, summary: &MovieSummary) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE movies SET
                title = $2,
                original_title = $3,
                original_language = $4,
                overview = $5,
                poster_path = $6,
                backdrop_path = $7,
                release_date = $8,
                adult = $9,
                video = $10,
                popularity = $11,
                vote_average = $12,
                vote_count = $13,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(summary.id)
        .bind(&summary.title)
        .bind(&summary.original_title)
        .bind(&summary.original_language)
        .bind(&summary.overview)
        .bind(&summary.poster_path)
        .bind(&summary.backdrop_path)
        .bind(summary.release_date)
        .bind(summary.adult)
        .bind(summary.video)
        .bind(summary.popularity)
        .bind(summary.vote_average)
        .bind(summary.vote_count)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_movie_details(
        &self,
        id: MovieId,
        details: &MovieDetails,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE movies SET
                runtime = $2,
                budget = $3,
                revenue = $4,
                homepage = $5,
                imdb_id = $6,
                tagline = $7,
                status = $8,
                details_fetched_at = $9,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(details.runtime)
        .bind(details.budget)
        .bind(details.revenue)
        .bind(&details.homepage)
        .bind(&details.imdb_id)
        .bind(&details.tagline)
        .bind(&details.status)
        .bind(details.fetched_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl GenreRepository for PostgresCatalog {
    async fn find_or_create_genre(&self, genre: &Genre) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO genres (id, name) VALUES ($1, $2) \
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(genre.id)
        .bind(&genre.name)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn movie_genre_ids(&self, movie: MovieId) -> Result<Vec<GenreId>> {
        let ids: Vec<GenreId> = sqlx::query_scalar(
            "SELECT genre_id FROM movie_genres WHERE movie_id = $1 \
             ORDER BY genre_id",
        )
        .bind(movie)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn link_genre(&self, movie: MovieId, genre: GenreId) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO movie_genres (movie_id, genre_id) VALUES ($1, $2) \
             ON CONFLICT (movie_id, genre_id) DO NOTHING",
        )
        .bind(movie)
        .bind(genre)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn unlink_genres(
        &self,
        movie: MovieId,
        genres: &[GenreId],
    ) -> Result<u64> {
        if genres.is_empty() {
            return Ok(0);
        }
        let ids: Vec<i64> = genres.iter().map(|genre| genre.0).collect();
        let result = sqlx::query(
            "DELETE FROM movie_genres WHERE movie_id = $1 \
             AND genre_id = ANY($2)",
        )
        .bind(movie)
        .bind(&ids)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl PeopleRepository for PostgresCatalog {
    async fn person_exists(&self, id: PersonId) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM people WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn create_person(&self, person: &Person) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO people (
                id, name, original_name, gender, adult, known_for_department,
                popularity, profile_path, also_known_as, biography, birthday,
                deathday, homepage, place_of_birth
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(person.id)
        .bind(&person.name)
        .bind(&person.original_name)
        .bind(person.gender)
        .bind(person.adult)
        .bind(&person.known_for_department)
        .bind(person.popularity)
        .bind(&person.profile_path)
        .bind(&person.also_known_as)
        .bind(&person.biography)
        .bind(person.birthday)
        .bind(person.deathday)
        .bind(&person.homepage)
        .bind(&person.place_of_birth)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CreditRepository for PostgresCatalog {
    async fn credit_exists(&self, id: &CreditId) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM credits WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn create_credit(&self, credit: &Credit) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO credits (
                id, movie_id, person_id, kind, department, job, character,
                position
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&credit.id)
        .bind(credit.movie_id)
        .bind(credit.person_id)
        .bind(credit.kind.as_str())
        .bind(&credit.department)
        .bind(&credit.job)
        .bind(&credit.character)
        .bind(credit.order)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ImageRepository for PostgresCatalog {
    async fn find_or_create_image(&self, image: &Image) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO images (
                file_path, kind, width, height, aspect_ratio, language,
                vote_average, vote_count
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (file_path) DO NOTHING
            "#,
        )
        .bind(&image.file_path)
        .bind(image.kind.as_str())
        .bind(image.width)
        .bind(image.height)
        .bind(image.aspect_ratio)
        .bind(&image.language)
        .bind(image.vote_average)
        .bind(image.vote_count)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn link_image(&self, movie: MovieId, file_path: &str) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO movie_images (movie_id, file_path) VALUES ($1, $2) \
             ON CONFLICT (movie_id, file_path) DO NOTHING",
        )
        .bind(movie)
        .bind(file_path)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn asset_refs(&self, limit: Option<usize>) -> Result<Vec<AssetRef>> {
        // LIMIT NULL means no limit in Postgres.
        let limit = limit.map(|n| i64::try_from(n).unwrap_or(i64::MAX));
        let rows: Vec<(MovieId, String)> = sqlx::query_as(
            "SELECT movie_id, file_path FROM movie_images \
             ORDER BY movie_id, file_path LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(movie, path)| AssetRef::new(movie, path))
            .collect())
    }
}
