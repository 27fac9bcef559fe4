mod support;

use std::sync::Arc;
use std::time::Duration;

use marquee_core::database::{
    CatalogCounts, GenreRepository, InMemoryCatalog, MovieRepository,
};
use marquee_core::sync::{PipelineOptions, SyncPipeline, SyncScheduler};
use marquee_model::{GenreId, MovieId};
use serde_json::json;
use support::{
    FixtureAssets, FixtureTransport, catalog_fixture, client, discover_movie,
    discover_page,
};

fn options(image_dir: &std::path::Path) -> PipelineOptions {
    PipelineOptions {
        page_delay: Duration::ZERO,
        image_dir: image_dir.to_path_buf(),
        ..PipelineOptions::default()
    }
}

fn pipeline(
    transport: Arc<FixtureTransport>,
    catalog: &InMemoryCatalog,
    assets: Arc<FixtureAssets>,
    image_dir: &std::path::Path,
) -> SyncPipeline {
    SyncPipeline::new(
        client(transport),
        Arc::new(catalog.clone()),
        assets,
        options(image_dir),
    )
}

#[tokio::test]
async fn second_run_creates_no_duplicate_rows() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let transport = catalog_fixture();
    let catalog = InMemoryCatalog::new();
    let assets = Arc::new(FixtureAssets::new(Duration::ZERO));
    let pipeline =
        pipeline(transport.clone(), &catalog, assets.clone(), dir.path());

    let first = pipeline.run().await?;
    let after_first = catalog.counts().await;

    assert_eq!(
        after_first,
        CatalogCounts {
            movies: 3,
            genres: 3,
            genre_links: 5,
            people: 3,
            credits: 4,
            images: 3,
            image_links: 4,
        }
    );
    assert_eq!(first.movies_created, 3);
    assert_eq!(first.details_fetched, 3);
    assert_eq!(first.credits_inserted, 4);
    assert_eq!(first.people_created, 3);
    let downloads = first.downloads.expect("downloads enabled");
    assert_eq!(downloads.downloaded, 3);
    assert!(downloads.failed.is_empty());

    transport.clear_requests();
    let second = pipeline.run().await?;

    assert_eq!(catalog.counts().await, after_first);
    assert_eq!(second.movies_created, 0);
    assert_eq!(second.details_fetched, 0);
    assert_eq!(second.genre_links_added, 0);
    assert_eq!(second.credits_inserted, 0);
    assert_eq!(second.credits_skipped, 4);
    assert_eq!(second.downloads.map(|d| d.skipped), Some(3));

    // Everything already stored is resolved locally.
    for path in ["/movie/101", "/credit/c-101-neo", "/person/500"] {
        assert_eq!(transport.request_count(path), 0, "{path} refetched");
    }
    Ok(())
}

#[tokio::test]
async fn genre_edges_stay_unique_across_runs() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let transport = catalog_fixture();
    let catalog = InMemoryCatalog::new();
    let assets = Arc::new(FixtureAssets::new(Duration::ZERO));
    let pipeline = pipeline(transport, &catalog, assets, dir.path());

    pipeline.run().await?;
    pipeline.run().await?;

    assert_eq!(
        catalog.movie_genre_ids(MovieId(101)).await?,
        vec![GenreId(1), GenreId(2)]
    );
    Ok(())
}

#[tokio::test]
async fn changed_genre_list_replaces_stale_edges() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let transport = catalog_fixture();
    let catalog = InMemoryCatalog::new();
    let assets = Arc::new(FixtureAssets::new(Duration::ZERO));
    let pipeline =
        pipeline(transport.clone(), &catalog, assets, dir.path());

    pipeline.run().await?;

    transport.page(
        "/discover/movie",
        1,
        discover_page(
            1,
            2,
            vec![
                discover_movie(101, "The Matrix", &[2, 3]),
                discover_movie(102, "John Wick", &[2, 3]),
            ],
        ),
    );
    let report = pipeline.run().await?;

    assert_eq!(
        catalog.movie_genre_ids(MovieId(101)).await?,
        vec![GenreId(2), GenreId(3)]
    );
    assert_eq!(report.genre_links_added, 1);
    assert_eq!(report.genre_links_removed, 1);
    Ok(())
}

#[tokio::test]
async fn summary_fields_refresh_but_details_are_fetched_once()
-> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let transport = catalog_fixture();
    let catalog = InMemoryCatalog::new();
    let assets = Arc::new(FixtureAssets::new(Duration::ZERO));
    let pipeline =
        pipeline(transport.clone(), &catalog, assets, dir.path());

    pipeline.run().await?;

    let mut renamed = discover_movie(103, "生死时速", &[1]);
    renamed["popularity"] = json!(99.0);
    transport.page("/discover/movie", 2, discover_page(2, 2, vec![renamed]));
    pipeline.run().await?;

    let movie = catalog.find_movie(MovieId(103)).await?.expect("stored");
    assert_eq!(movie.title, "生死时速");
    assert_eq!(movie.popularity, 99.0);
    assert_eq!(movie.runtime, Some(116));
    assert_eq!(movie.imdb_id.as_deref(), Some("tt0000103"));
    assert_eq!(transport.request_count("/movie/103"), 1);
    Ok(())
}

#[tokio::test]
async fn image_and_credit_failures_do_not_stop_the_run() -> anyhow::Result<()>
{
    let dir = tempfile::tempdir()?;
    let transport = catalog_fixture();
    transport.raw("/movie/102/credits", 500, "{}");
    transport.raw("/movie/101/images", 200, "not json");
    let catalog = InMemoryCatalog::new();
    let assets = Arc::new(FixtureAssets::new(Duration::ZERO));
    let pipeline = pipeline(transport, &catalog, assets, dir.path());

    let report = pipeline.run().await?;

    assert_eq!(report.movies_seen, 3);
    assert_eq!(report.credit_lists_failed, 1);
    assert_eq!(report.image_sync_failures, 1);
    assert_eq!(report.credits_inserted, 3);
    // Only 102's shared poster remains linked.
    assert_eq!(catalog.counts().await.image_links, 1);
    Ok(())
}

#[tokio::test]
async fn walk_failure_aborts_before_any_reconciliation() -> anyhow::Result<()>
{
    let dir = tempfile::tempdir()?;
    let transport = catalog_fixture();
    transport.page_status("/discover/movie", 2, 502);
    let catalog = InMemoryCatalog::new();
    let assets = Arc::new(FixtureAssets::new(Duration::ZERO));
    let scheduler = SyncScheduler::new(Arc::new(pipeline(
        transport,
        &catalog,
        assets,
        dir.path(),
    )));

    let err = scheduler.run_once().await.unwrap_err();

    assert_eq!(err.status_code(), Some(502));
    let counts = catalog.counts().await;
    assert_eq!(counts.movies, 0);
    // Genres are synced before the walk starts.
    assert_eq!(counts.genres, 3);
    Ok(())
}

#[tokio::test]
async fn stored_assets_download_without_api_calls() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let transport = catalog_fixture();
    let catalog = InMemoryCatalog::new();
    let assets = Arc::new(FixtureAssets::new(Duration::ZERO));

    let mut opts = options(dir.path());
    opts.download_images = false;
    let pipeline = SyncPipeline::new(
        client(transport.clone()),
        Arc::new(catalog.clone()),
        assets.clone(),
        opts,
    );

    let report = pipeline.run().await?;
    assert!(report.downloads.is_none());
    assert!(assets.opened().is_empty());

    transport.clear_requests();
    let summary = pipeline.download_stored_assets(Some(2)).await?;

    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.downloaded, 2);
    assert!(transport.requests().is_empty());
    Ok(())
}
