//! # marqueectl
//!
//! Triggers the Marquee TMDB sync pipeline.
//!
//! - `sync --manual` runs the full pipeline once and exits non-zero on
//!   failure.
//! - `sync` without `--manual` runs on a fixed interval until stopped.
//! - `images` downloads image assets already linked in the database.
//! - `migrate` applies the bundled schema migrations.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use marquee_config::{AppConfig, MAX_SYNC_INTERVAL, TokenProvider};
use marquee_core::database::{
    CatalogRepository, InMemoryCatalog, PostgresCatalog,
};
use marquee_core::sync::{SyncPipeline, SyncScheduler};
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "marqueectl", version)]
#[command(about = "Mirror the TMDB movie catalogue into a local database")]
struct Cli {
    /// Path to the TOML configuration file (defaults to ./marquee.toml)
    #[arg(long, short, global = true, env = "MARQUEE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the sync pipeline once or on a timer
    Sync(SyncArgs),
    /// Download image assets already linked in the database
    Images(ImagesArgs),
    /// Apply database migrations
    Migrate,
}

#[derive(Debug, Args)]
struct SyncArgs {
    /// Run the pipeline once and exit
    #[arg(long)]
    manual: bool,

    /// Minutes between periodic runs (overrides `sync.interval`)
    #[arg(
        long,
        value_name = "MINUTES",
        value_parser = clap::value_parser!(u64)
            .range(1..=MAX_SYNC_INTERVAL.as_secs() / 60)
    )]
    interval: Option<u64>,

    /// In periodic mode, run immediately instead of after the first interval
    #[arg(long)]
    run_on_start: bool,

    /// Use an in-memory catalog instead of PostgreSQL
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Args)]
struct ImagesArgs {
    /// Maximum number of stored movie-image links to process
    #[arg(long, value_name = "N")]
    limit: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,marquee_core=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load(cli.config.as_deref())
        .context("failed to load configuration")?;

    match cli.command {
        Command::Sync(args) => run_sync(&config, args).await,
        Command::Images(args) => run_images(&config, args).await,
        Command::Migrate => {
            let catalog = connect(&config).await?;
            catalog.migrate().await.context("migration failed")?;
            Ok(())
        }
    }
}

async fn connect(config: &AppConfig) -> anyhow::Result<PostgresCatalog> {
    let Some(url) = config.database.url.as_deref() else {
        bail!("no database configured; set DATABASE_URL or [database].url");
    };
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(url)
        .await
        .context("failed to connect to PostgreSQL")?;
    Ok(PostgresCatalog::new(pool))
}

async fn run_sync(config: &AppConfig, args: SyncArgs) -> anyhow::Result<()> {
    config
        .tmdb
        .api_token()
        .context("cannot sync without a TMDB API token")?;

    let store: Arc<dyn CatalogRepository> = if args.dry_run {
        warn!("dry run: catalog is kept in memory and discarded on exit");
        Arc::new(InMemoryCatalog::new())
    } else {
        Arc::new(connect(config).await?)
    };

    let pipeline = SyncPipeline::from_config(config, store)
        .context("failed to build sync pipeline")?;
    let scheduler = SyncScheduler::new(Arc::new(pipeline));

    if args.manual {
        let report = scheduler.run_once().await.context("sync failed")?;
        info!(
            isolated_failures = report.isolated_failures(),
            "manual sync complete"
        );
        return Ok(());
    }

    let interval = match args.interval {
        Some(minutes) => minutes
            .checked_mul(60)
            .map(Duration::from_secs)
            .filter(|interval| *interval <= MAX_SYNC_INTERVAL)
            .context("--interval is out of range")?,
        None => config.sync.interval,
    };
    let run_on_start = args.run_on_start || config.sync.run_on_start;

    info!(
        interval_mins = interval.as_secs() / 60,
        run_on_start,
        "starting periodic sync"
    );
    scheduler.run_forever(interval, run_on_start).await;
    Ok(())
}

async fn run_images(config: &AppConfig, args: ImagesArgs) -> anyhow::Result<()> {
    let store = Arc::new(connect(config).await?);
    let pipeline = SyncPipeline::from_config(config, store)
        .context("failed to build sync pipeline")?;

    let summary = pipeline
        .download_stored_assets(args.limit)
        .await
        .context("failed to list stored assets")?;
    info!("{summary}");
    if !summary.failed.is_empty() {
        warn!(failed = summary.failed.len(), "some assets failed to download");
    }
    Ok(())
}
