use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use marquee_config::{AppConfig, SyncSettings};
use marquee_model::AssetRef;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::database::CatalogRepository;
use crate::error::Result;
use crate::sync::assets::{
    AssetFetcher, AssetSource, DownloadSummary, HttpAssetSource,
};
use crate::sync::credits::CreditExpander;
use crate::sync::genres::GenreCatalogSync;
use crate::sync::images::ImageCatalogSync;
use crate::sync::reconciler::EntityReconciler;
use crate::sync::report::SyncReport;
use crate::sync::walker::PageWalker;
use crate::tmdb::TmdbClient;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub sort_by: String,
    pub page_cap: u32,
    pub page_delay: Duration,
    pub images_per_kind: usize,
    pub image_dir: PathBuf,
    pub download_concurrency: usize,
    pub download_images: bool,
}

impl From<&SyncSettings> for PipelineOptions {
    fn from(sync: &SyncSettings) -> Self {
        Self {
            sort_by: sync.sort_by.clone(),
            page_cap: sync.page_cap,
            page_delay: sync.page_delay,
            images_per_kind: sync.images_per_kind,
            image_dir: sync.image_dir.clone(),
            download_concurrency: sync.download_concurrency,
            download_images: sync.download_images,
        }
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from(&SyncSettings::default())
    }
}

/// Full sync: genres, discovery walk, then per movie reconcile, credits and
/// images, then asset downloads.
///
/// Movies are processed one at a time in page order. Genre sync, the walk
/// and reconciliation abort the run on error; credits, images and
/// downloads isolate per-item failures and count them in the report.
#[derive(Debug, Clone)]
pub struct SyncPipeline {
    genres: GenreCatalogSync,
    walker: PageWalker,
    reconciler: EntityReconciler,
    credits: CreditExpander,
    images: ImageCatalogSync,
    fetcher: AssetFetcher,
    store: Arc<dyn CatalogRepository>,
    options: PipelineOptions,
}

impl SyncPipeline {
    pub fn new(
        client: TmdbClient,
        store: Arc<dyn CatalogRepository>,
        assets: Arc<dyn AssetSource>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            genres: GenreCatalogSync::new(client.clone(), Arc::clone(&store)),
            walker: PageWalker::new(
                client.clone(),
                options.page_cap,
                options.page_delay,
            ),
            reconciler: EntityReconciler::new(
                client.clone(),
                Arc::clone(&store),
            ),
            credits: CreditExpander::new(client.clone(), Arc::clone(&store)),
            images: ImageCatalogSync::new(
                client,
                Arc::clone(&store),
                options.images_per_kind,
            ),
            fetcher: AssetFetcher::new(
                assets,
                options.image_dir.clone(),
                options.download_concurrency,
            ),
            store,
            options,
        }
    }

    /// Wire the pipeline against the live TMDB API and image CDN.
    pub fn from_config(
        config: &AppConfig,
        store: Arc<dyn CatalogRepository>,
    ) -> Result<Self> {
        let client = TmdbClient::from_settings(&config.tmdb, &config.sync)?;
        let assets = HttpAssetSource::new(
            &config.tmdb.image_base_url,
            config.sync.request_timeout,
        )?;
        Ok(Self::new(
            client,
            store,
            Arc::new(assets),
            PipelineOptions::from(&config.sync),
        ))
    }

    pub async fn run(&self) -> Result<SyncReport> {
        let started = Instant::now();
        let mut report = SyncReport {
            genres_created: self.genres.sync().await?,
            ..SyncReport::default()
        };

        let walk = self.walker.discover(&self.options.sort_by).await?;
        report.pages_fetched = walk.pages_fetched;

        let mut assets: Vec<AssetRef> = Vec::new();
        for raw in &walk.movies {
            let outcome = self.reconciler.reconcile(raw).await?;
            report.record_reconcile(&outcome);
            let movie_id = outcome.movie_id;

            match self.credits.expand(movie_id).await {
                Ok(expanded) => report.record_expand(&expanded),
                Err(err) => {
                    report.credit_lists_failed += 1;
                    warn!(
                        movie_id = %movie_id,
                        "credit list fetch failed: {err}"
                    );
                }
            }

            match self.images.sync(movie_id).await {
                Ok(refs) => {
                    report.images_linked += refs.len();
                    assets.extend(refs);
                }
                Err(err) => {
                    report.image_sync_failures += 1;
                    warn!(movie_id = %movie_id, "image sync failed: {err}");
                }
            }
        }

        if self.options.download_images {
            report.downloads = Some(self.fetcher.download_all(assets).await);
        }

        report.elapsed = started.elapsed();
        info!(
            elapsed_ms = report.elapsed.as_millis() as u64,
            "sync finished: {report}"
        );
        Ok(report)
    }

    /// Download assets already linked in storage, without calling the
    /// catalog API.
    pub async fn download_stored_assets(
        &self,
        limit: Option<usize>,
    ) -> Result<DownloadSummary> {
        let refs = self.store.asset_refs(limit).await?;
        info!(count = refs.len(), "downloading stored assets");
        Ok(self.fetcher.download_all(refs).await)
    }
}
