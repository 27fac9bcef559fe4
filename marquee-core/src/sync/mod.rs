//! Pipeline stages and the trigger that runs them.

pub mod assets;
pub mod credits;
pub mod genres;
pub mod images;
pub mod pipeline;
pub mod reconciler;
pub mod report;
pub mod scheduler;
pub mod walker;

pub use assets::{
    AssetFailure, AssetFetcher, AssetSource, ByteStream, DownloadSummary,
    HttpAssetSource,
};
pub use credits::{CreditExpander, ExpandReport};
pub use genres::GenreCatalogSync;
pub use images::ImageCatalogSync;
pub use pipeline::{PipelineOptions, SyncPipeline};
pub use reconciler::{EntityReconciler, ReconcileOutcome};
pub use report::SyncReport;
pub use scheduler::{SyncJob, SyncScheduler};
pub use walker::{DiscoverWalk, PageWalker};
