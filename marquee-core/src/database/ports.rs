use std::fmt;

use async_trait::async_trait;
use marquee_model::{
    AssetRef, Credit, CreditId, Genre, GenreId, Image, Movie, MovieDetails,
    MovieId, MovieSummary, Person, PersonId,
};

use crate::error::Result;

/// Result of a find-or-create: the stored row and whether this call made it.
#[derive(Debug, Clone, PartialEq)]
pub enum FindOrCreate<T> {
    Existing(T),
    Created(T),
}

impl<T> FindOrCreate<T> {
    pub fn was_created(&self) -> bool {
        matches!(self, FindOrCreate::Created(_))
    }
}

#[async_trait]
pub trait MovieRepository: Send + Sync {
    async fn find_movie(&self, id: MovieId) -> Result<Option<Movie>>;

    /// Insert `movie` unless a row with the same id exists; either way
    /// return the stored row.
    async fn find_or_create_movie(
        &self,
        movie: &Movie,
    ) -> Result<FindOrCreate<Movie>>;

    async fn update_movie_summary(&self, summary: &MovieSummary) -> Result<()>;

    async fn update_movie_details(
        &self,
        id: MovieId,
        details: &MovieDetails,
    ) -> Result<()>;
}

#[async_trait]
pub trait GenreRepository: Send + Sync {
    /// Returns `true` when the genre row was inserted.
    async fn find_or_create_genre(&self, genre: &Genre) -> Result<bool>;

    async fn movie_genre_ids(&self, movie: MovieId) -> Result<Vec<GenreId>>;

    /// Insert-if-absent for one movie→genre edge. Returns `true` when added.
    async fn link_genre(&self, movie: MovieId, genre: GenreId) -> Result<bool>;

    /// Remove the listed edges; returns how many existed.
    async fn unlink_genres(
        &self,
        movie: MovieId,
        genres: &[GenreId],
    ) -> Result<u64>;
}

#[async_trait]
pub trait PeopleRepository: Send + Sync {
    async fn person_exists(&self, id: PersonId) -> Result<bool>;

    /// Returns `true` when the person row was inserted.
    async fn create_person(&self, person: &Person) -> Result<bool>;
}

#[async_trait]
pub trait CreditRepository: Send + Sync {
    async fn credit_exists(&self, id: &CreditId) -> Result<bool>;

    /// Credits are immutable once stored; returns `false` if the id exists.
    async fn create_credit(&self, credit: &Credit) -> Result<bool>;
}

#[async_trait]
pub trait ImageRepository: Send + Sync {
    /// Images are keyed by remote file path. Returns `true` when inserted.
    async fn find_or_create_image(&self, image: &Image) -> Result<bool>;

    async fn link_image(&self, movie: MovieId, file_path: &str) -> Result<bool>;

    /// Stored movie→image links, ordered by movie then path.
    async fn asset_refs(&self, limit: Option<usize>) -> Result<Vec<AssetRef>>;
}

/// Everything the pipeline needs from storage.
pub trait CatalogRepository:
    fmt::Debug
    + MovieRepository
    + GenreRepository
    + PeopleRepository
    + CreditRepository
    + ImageRepository
{
}

impl<T> CatalogRepository for T where
    T: fmt::Debug
        + MovieRepository
        + GenreRepository
        + PeopleRepository
        + CreditRepository
        + ImageRepository
{
}
