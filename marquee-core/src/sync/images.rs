use std::sync::Arc;

use marquee_model::{AssetRef, ImageKind, MovieId};
use tracing::debug;

use crate::database::CatalogRepository;
use crate::error::Result;
use crate::tmdb::TmdbClient;

/// Stores image metadata for a movie and links it, keeping at most
/// `per_kind` entries of each kind in source order.
#[derive(Debug, Clone)]
pub struct ImageCatalogSync {
    client: TmdbClient,
    store: Arc<dyn CatalogRepository>,
    per_kind: usize,
}

impl ImageCatalogSync {
    pub fn new(
        client: TmdbClient,
        store: Arc<dyn CatalogRepository>,
        per_kind: usize,
    ) -> Self {
        Self {
            client,
            store,
            per_kind,
        }
    }

    /// Returns every asset now linked to the movie by this call or earlier.
    pub async fn sync(&self, movie_id: MovieId) -> Result<Vec<AssetRef>> {
        let images = self.client.movie_images(movie_id).await?;
        let mut refs = Vec::new();

        for kind in ImageKind::ALL {
            let entries = images
                .of_kind(kind)
                .iter()
                .filter(|entry| !entry.file_path.trim().is_empty())
                .take(self.per_kind);
            for entry in entries {
                let image = entry.to_image(kind);
                self.store.find_or_create_image(&image).await?;
                self.store.link_image(movie_id, &image.file_path).await?;
                refs.push(AssetRef::new(movie_id, image.file_path));
            }
        }

        debug!(movie_id = %movie_id, linked = refs.len(), "images synced");
        Ok(refs)
    }
}
