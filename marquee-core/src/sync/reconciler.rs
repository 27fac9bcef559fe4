use std::sync::Arc;

use chrono::Utc;
use marquee_model::{GenreId, Movie, MovieId};
use tracing::{debug, info};

use crate::database::{CatalogRepository, FindOrCreate};
use crate::error::Result;
use crate::tmdb::TmdbClient;
use crate::tmdb::models::DiscoverMovie;

/// What reconciling one discovered movie changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub movie_id: MovieId,
    pub created: bool,
    pub details_fetched: bool,
    pub genres_added: usize,
    pub genres_removed: u64,
}

/// Merges a discovered movie into storage by its TMDB id.
///
/// Every step is an idempotent write, so a run interrupted mid-movie is
/// completed by simply reconciling the same movie again.
#[derive(Debug, Clone)]
pub struct EntityReconciler {
    client: TmdbClient,
    store: Arc<dyn CatalogRepository>,
}

impl EntityReconciler {
    pub fn new(client: TmdbClient, store: Arc<dyn CatalogRepository>) -> Self {
        Self { client, store }
    }

    pub async fn reconcile(
        &self,
        raw: &DiscoverMovie,
    ) -> Result<ReconcileOutcome> {
        let summary = raw.to_summary();
        let movie_id = summary.id;

        let stored = self
            .store
            .find_or_create_movie(&Movie::from_summary(summary.clone()))
            .await?;
        let created = stored.was_created();
        let movie = match stored {
            FindOrCreate::Created(movie) => movie,
            FindOrCreate::Existing(mut movie) => {
                self.store.update_movie_summary(&summary).await?;
                movie.apply_summary(&summary);
                movie
            }
        };

        let details_fetched = if movie.needs_details() {
            let details = self
                .client
                .movie_details(movie_id)
                .await?
                .into_details(Utc::now());
            self.store.update_movie_details(movie_id, &details).await?;
            debug!(
                movie_id = %movie_id,
                runtime = ?details.runtime,
                "movie details stored"
            );
            true
        } else {
            false
        };

        let (genres_added, genres_removed) =
            self.reconcile_genres(movie_id, &raw.genre_set()).await?;

        if created {
            info!(movie_id = %movie_id, title = %movie.title, "movie added");
        }

        Ok(ReconcileOutcome {
            movie_id,
            created,
            details_fetched,
            genres_added,
            genres_removed,
        })
    }

    /// Make the stored edge set equal `wanted`.
    async fn reconcile_genres(
        &self,
        movie_id: MovieId,
        wanted: &[GenreId],
    ) -> Result<(usize, u64)> {
        let current = self.store.movie_genre_ids(movie_id).await?;

        let stale: Vec<GenreId> = current
            .iter()
            .copied()
            .filter(|genre| !wanted.contains(genre))
            .collect();
        let removed = if stale.is_empty() {
            0
        } else {
            self.store.unlink_genres(movie_id, &stale).await?
        };

        let mut added = 0;
        for genre in wanted.iter().filter(|genre| !current.contains(genre)) {
            if self.store.link_genre(movie_id, *genre).await? {
                added += 1;
            }
        }

        if added > 0 || removed > 0 {
            debug!(movie_id = %movie_id, added, removed, "genre links reconciled");
        }
        Ok((added, removed))
    }
}
