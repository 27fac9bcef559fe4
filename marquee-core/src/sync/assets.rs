use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use marquee_model::AssetRef;
use tokio::io::AsyncWriteExt;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use crate::error::{Result, SyncError, TransportError};

pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// Remote store that asset paths are resolved against.
#[async_trait]
pub trait AssetSource: Send + Sync + fmt::Debug {
    async fn open(&self, file_path: &str) -> Result<ByteStream>;
}

/// Streams assets over HTTP from a fixed base URL.
#[derive(Debug, Clone)]
pub struct HttpAssetSource {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAssetSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Url::parse(base_url).map_err(|err| {
            SyncError::HttpClient(format!("invalid base URL {base_url:?}: {err}"))
        })?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| SyncError::HttpClient(err.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, file_path: &str) -> String {
        format!("{}/{}", self.base_url, file_path.trim_start_matches('/'))
    }
}

#[async_trait]
impl AssetSource for HttpAssetSource {
    async fn open(&self, file_path: &str) -> Result<ByteStream> {
        let url = self.url_for(file_path);
        let response = self.http.get(&url).send().await.map_err(|err| {
            SyncError::Transport {
                attempts: 1,
                source: err.into(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::RemoteStatus {
                code: status.as_u16(),
            });
        }

        Ok(response
            .bytes_stream()
            .map(|chunk| {
                chunk.map_err(|err| SyncError::Transport {
                    attempts: 1,
                    source: TransportError::from(err),
                })
            })
            .boxed())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFailure {
    pub file_path: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    /// Distinct asset paths submitted.
    pub attempted: usize,
    pub downloaded: usize,
    /// Already present on disk.
    pub skipped: usize,
    pub failed: Vec<AssetFailure>,
}

impl DownloadSummary {
    pub fn succeeded(&self) -> usize {
        self.downloaded + self.skipped
    }
}

impl fmt::Display for DownloadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "assets {} attempted, {} downloaded, {} skipped, {} failed",
            self.attempted,
            self.downloaded,
            self.skipped,
            self.failed.len()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssetOutcome {
    Downloaded,
    Skipped,
}

/// Downloads assets under `root` with at most `concurrency` transfers in
/// flight.
#[derive(Debug, Clone)]
pub struct AssetFetcher {
    source: Arc<dyn AssetSource>,
    root: PathBuf,
    permits: Arc<Semaphore>,
}

impl AssetFetcher {
    pub fn new(
        source: Arc<dyn AssetSource>,
        root: impl Into<PathBuf>,
        concurrency: usize,
    ) -> Self {
        Self {
            source,
            root: root.into(),
            permits: Arc::new(Semaphore::new(concurrency.max(1))),
        }
    }

    /// Attempt every distinct asset path and return once all have finished.
    ///
    /// A failed asset is recorded in the summary and never cancels its
    /// siblings.
    pub async fn download_all(&self, assets: Vec<AssetRef>) -> DownloadSummary {
        let mut seen = HashSet::new();
        let unique: Vec<AssetRef> = assets
            .into_iter()
            .filter(|asset| seen.insert(asset.file_path.clone()))
            .collect();

        let mut summary = DownloadSummary {
            attempted: unique.len(),
            ..DownloadSummary::default()
        };
        let mut handles: Vec<(String, JoinHandle<Result<AssetOutcome>>)> =
            Vec::with_capacity(unique.len());

        for asset in unique {
            let permit = match self.permits.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(err) => {
                    summary.failed.push(AssetFailure {
                        file_path: asset.file_path,
                        error: err.to_string(),
                    });
                    continue;
                }
            };

            let source = Arc::clone(&self.source);
            let root = self.root.clone();
            let file_path = asset.file_path.clone();
            let handle = tokio::spawn(async move {
                let result = fetch_one(source.as_ref(), &root, &asset).await;
                drop(permit);
                result
            });
            handles.push((file_path, handle));
        }

        for (file_path, handle) in handles {
            let result = match handle.await {
                Ok(result) => result.map_err(|err| err.to_string()),
                Err(join_err) => {
                    Err(format!("download task aborted: {join_err}"))
                }
            };
            match result {
                Ok(AssetOutcome::Downloaded) => summary.downloaded += 1,
                Ok(AssetOutcome::Skipped) => summary.skipped += 1,
                Err(error) => {
                    warn!(
                        file_path = %file_path,
                        "asset download failed: {error}"
                    );
                    summary.failed.push(AssetFailure { file_path, error });
                }
            }
        }

        info!(
            attempted = summary.attempted,
            downloaded = summary.downloaded,
            skipped = summary.skipped,
            failed = summary.failed.len(),
            "asset downloads finished"
        );
        summary
    }
}

async fn fetch_one(
    source: &dyn AssetSource,
    root: &Path,
    asset: &AssetRef,
) -> Result<AssetOutcome> {
    let path = asset
        .local_path(root)
        .ok_or_else(|| SyncError::InvalidAsset(asset.file_path.clone()))?;

    if tokio::fs::try_exists(&path).await.unwrap_or(false) {
        return Ok(AssetOutcome::Skipped);
    }

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let stream = source.open(&asset.file_path).await?;
    let tmp = temp_path_for(&path);

    if let Err(err) = write_stream(&tmp, stream).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(err);
    }

    // Another run may have produced the file meanwhile.
    if tokio::fs::try_exists(&path).await.unwrap_or(false) {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Ok(AssetOutcome::Skipped);
    }

    if let Err(err) = tokio::fs::rename(&tmp, &path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(err.into());
    }

    debug!(
        movie_id = %asset.movie_id,
        path = %path.display(),
        "asset stored"
    );
    Ok(AssetOutcome::Downloaded)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp-{}", Uuid::new_v4().simple()))
}

async fn write_stream(tmp: &Path, mut stream: ByteStream) -> Result<()> {
    let mut file = tokio::fs::File::create(tmp).await?;
    while let Some(chunk) = stream.next().await {
        file.write_all(&chunk?).await?;
    }
    file.flush().await?;
    Ok(())
}
