use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use marquee_config::MAX_SYNC_INTERVAL;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{error, info};

use crate::error::Result;
use crate::sync::pipeline::SyncPipeline;
use crate::sync::report::SyncReport;

/// A complete sync run the scheduler can trigger.
#[async_trait]
pub trait SyncJob: Send + Sync + fmt::Debug {
    async fn run(&self) -> Result<SyncReport>;
}

#[async_trait]
impl SyncJob for SyncPipeline {
    async fn run(&self) -> Result<SyncReport> {
        SyncPipeline::run(self).await
    }
}

/// Runs a [`SyncJob`] once or on a fixed timer.
#[derive(Debug, Clone)]
pub struct SyncScheduler {
    job: Arc<dyn SyncJob>,
}

impl SyncScheduler {
    pub fn new(job: Arc<dyn SyncJob>) -> Self {
        Self { job }
    }

    /// Manual mode: one run, result returned to the caller.
    pub async fn run_once(&self) -> Result<SyncReport> {
        info!("manual sync started");
        let result = self.job.run().await;
        match &result {
            Ok(report) => info!("manual sync succeeded: {report}"),
            Err(err) => error!("manual sync failed: {err}"),
        }
        result
    }

    /// Periodic mode. Never returns; a failed run is logged and the next
    /// tick runs again.
    ///
    /// With `run_on_start` the first run starts immediately, otherwise
    /// after one full `interval`. The interval is capped at
    /// [`MAX_SYNC_INTERVAL`].
    pub async fn run_forever(&self, interval: Duration, run_on_start: bool) {
        self.run_ticks(interval, run_on_start, None).await;
    }

    async fn run_ticks(
        &self,
        interval: Duration,
        run_on_start: bool,
        max_runs: Option<usize>,
    ) -> usize {
        let interval =
            interval.clamp(Duration::from_millis(1), MAX_SYNC_INTERVAL);
        let first = if run_on_start {
            Instant::now()
        } else {
            Instant::now() + interval
        };
        let mut timer = tokio::time::interval_at(first, interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_secs = interval.as_secs(),
            run_on_start,
            "periodic sync scheduled"
        );

        let mut runs = 0;
        loop {
            if max_runs.is_some_and(|max| runs >= max) {
                return runs;
            }
            timer.tick().await;
            runs += 1;

            match self.job.run().await {
                Ok(report) => {
                    info!(run = runs, "periodic sync finished: {report}")
                }
                Err(err) => error!(run = runs, "periodic sync failed: {err}"),
            }
        }
    }
}
