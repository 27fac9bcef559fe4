use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use marquee_model::{
    AssetRef, Credit, CreditId, Genre, GenreId, Image, Movie, MovieDetails,
    MovieId, MovieSummary, Person, PersonId,
};

use crate::database::ports::{
    CreditRepository, FindOrCreate, GenreRepository, ImageRepository,
    MovieRepository, PeopleRepository,
};
use crate::error::{Result, SyncError};

/// Row counts per table, used to compare catalog state between runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogCounts {
    pub movies: usize,
    pub genres: usize,
    pub genre_links: usize,
    pub people: usize,
    pub credits: usize,
    pub images: usize,
    pub image_links: usize,
}

/// Catalog kept in process memory.
///
/// Backs dry runs and tests; every operation has the same insert-if-absent
/// semantics as the Postgres adapter.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    state: Arc<tokio::sync::Mutex<CatalogState>>,
}

impl fmt::Debug for InMemoryCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("InMemoryCatalog");
        match self.state.try_lock() {
            Ok(state) => {
                debug.field("counts", &state.counts());
            }
            Err(_) => {
                debug.field("state", &"<locked>");
            }
        }
        debug.finish()
    }
}

#[derive(Debug, Default)]
struct CatalogState {
    movies: BTreeMap<MovieId, Movie>,
    genres: BTreeMap<GenreId, Genre>,
    movie_genres: BTreeSet<(MovieId, GenreId)>,
    people: BTreeMap<PersonId, Person>,
    credits: BTreeMap<CreditId, Credit>,
    images: BTreeMap<String, Image>,
    movie_images: BTreeSet<(MovieId, String)>,
}

impl CatalogState {
    fn counts(&self) -> CatalogCounts {
        CatalogCounts {
            movies: self.movies.len(),
            genres: self.genres.len(),
            genre_links: self.movie_genres.len(),
            people: self.people.len(),
            credits: self.credits.len(),
            images: self.images.len(),
            image_links: self.movie_images.len(),
        }
    }
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn counts(&self) -> CatalogCounts {
        self.state.lock().await.counts()
    }

    /// Credits for `movie` ordered by kind then position.
    pub async fn credits_for(&self, movie: MovieId) -> Vec<Credit> {
        let state = self.state.lock().await;
        let mut credits: Vec<Credit> = state
            .credits
            .values()
            .filter(|credit| credit.movie_id == movie)
            .cloned()
            .collect();
        credits.sort_by_key(|credit| (credit.kind.as_str(), credit.order));
        credits
    }

    pub async fn person(&self, id: PersonId) -> Option<Person> {
        self.state.lock().await.people.get(&id).cloned()
    }

    pub async fn image(&self, file_path: &str) -> Option<Image> {
        self.state.lock().await.images.get(file_path).cloned()
    }
}

#[async_trait]
impl MovieRepository for InMemoryCatalog {
    async fn find_movie(&self, id: MovieId) -> Result<Option<Movie>> {
        Ok(self.state.lock().await.movies.get(&id).cloned())
    }

    async fn find_or_create_movie(
        &self,
        movie: &Movie,
    ) -> Result<FindOrCreate<Movie>> {
        let mut state = self.state.lock().await;
        if let Some(existing) = state.movies.get(&movie.id) {
            return Ok(FindOrCreate::Existing(existing.clone()));
        }
        state.movies.insert(movie.id, movie.clone());
        Ok(FindOrCreate::Created(movie.clone()))
    }

    async fn update_movie_summary(&self, summary: &MovieSummary) -> Result<()> {
        let mut state = self.state.lock().await;
        let movie = state.movies.get_mut(&summary.id).ok_or_else(|| {
            SyncError::Storage(format!("movie {} not found", summary.id))
        })?;
        movie.apply_summary(summary);
        Ok(())
    }

    async fn update_movie_details(
        &self,
        id: MovieId,
        details: &MovieDetails,
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        let movie = state
            .movies
            .get_mut(&id)
            .ok_or_else(|| SyncError::Storage(format!("movie {id} not found")))?;
        movie.apply_details(details);
        Ok(())
    }
}

#[async_trait]
impl GenreRepository for InMemoryCatalog {
    async fn find_or_create_genre(&self, genre: &Genre) -> Result<bool> {
        let mut state = self.state.lock().await;
        if state.genres.contains_key(&genre.id) {
            return Ok(false);
        }
        state.genres.insert(genre.id, genre.clone());
        Ok(true)
    }

    async fn movie_genre_ids(&self, movie: MovieId) -> Result<Vec<GenreId>> {
        let state = self.state.lock().await;
        Ok(state
            .movie_genres
            .range((movie, GenreId(i64::MIN))..=(movie, GenreId(i64::MAX)))
            .map(|(_, genre)| *genre)
            .collect())
    }

    async fn link_genre(&self, movie: MovieId, genre: GenreId) -> Result<bool> {
        Ok(self.state.lock().await.movie_genres.insert((movie, genre)))
    }

    async fn unlink_genres(
        &self,
        movie: MovieId,
        genres: &[GenreId],
    ) -> Result<u64> {
        let mut state = self.state.lock().await;
        let removed = genres
            .iter()
            .filter(|genre| state.movie_genres.remove(&(movie, **genre)))
            .count();
        Ok(removed as u64)
    }
}

#[async_trait]
impl PeopleRepository for InMemoryCatalog {
    async fn person_exists(&self, id: PersonId) -> Result<bool> {
        Ok(self.state.lock().await.people.contains_key(&id))
    }

    async fn create_person(&self, person: &Person) -> Result<bool> {
        let mut state = self.state.lock().await;
        if state.people.contains_key(&person.id) {
            return Ok(false);
        }
        state.people.insert(person.id, person.clone());
        Ok(true)
    }
}

#[async_trait]
impl CreditRepository for InMemoryCatalog {
    async fn credit_exists(&self, id: &CreditId) -> Result<bool> {
        Ok(self.state.lock().await.credits.contains_key(id))
    }

    async fn create_credit(&self, credit: &Credit) -> Result<bool> {
        let mut state = self.state.lock().await;
        if state.credits.contains_key(&credit.id) {
            return Ok(false);
        }
        state.credits.insert(credit.id.clone(), credit.clone());
        Ok(true)
    }
}

#[async_trait]
impl ImageRepository for InMemoryCatalog {
    async fn find_or_create_image(&self, image: &Image) -> Result<bool> {
        let mut state = self.state.lock().await;
        if state.images.contains_key(&image.file_path) {
            return Ok(false);
        }
        state.images.insert(image.file_path.clone(), image.clone());
        Ok(true)
    }

    async fn link_image(&self, movie: MovieId, file_path: &str) -> Result<bool> {
        Ok(self
            .state
            .lock()
            .await
            .movie_images
            .insert((movie, file_path.to_string())))
    }

    async fn asset_refs(&self, limit: Option<usize>) -> Result<Vec<AssetRef>> {
        let state = self.state.lock().await;
        Ok(state
            .movie_images
            .iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(|(movie, path)| AssetRef::new(*movie, path.clone()))
            .collect())
    }
}
