use std::sync::Arc;

use marquee_model::Genre;
use tracing::info;

use crate::database::CatalogRepository;
use crate::error::Result;
use crate::tmdb::TmdbClient;

/// Refreshes the global genre catalogue. Returns how many genres were new.
#[derive(Debug, Clone)]
pub struct GenreCatalogSync {
    client: TmdbClient,
    store: Arc<dyn CatalogRepository>,
}

impl GenreCatalogSync {
    pub fn new(client: TmdbClient, store: Arc<dyn CatalogRepository>) -> Self {
        Self { client, store }
    }

    pub async fn sync(&self) -> Result<usize> {
        let list = self.client.movie_genres().await?;
        let total = list.genres.len();

        let mut created = 0;
        for entry in list.genres {
            let genre = Genre::from(entry);
            if self.store.find_or_create_genre(&genre).await? {
                created += 1;
            }
        }

        info!(total, created, "genre catalogue synced");
        Ok(created)
    }
}
