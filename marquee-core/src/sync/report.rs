use std::fmt;
use std::time::Duration;

use crate::sync::assets::DownloadSummary;
use crate::sync::credits::ExpandReport;
use crate::sync::reconciler::ReconcileOutcome;

/// Tally of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub genres_created: usize,
    pub pages_fetched: u32,
    pub movies_seen: usize,
    pub movies_created: usize,
    pub details_fetched: usize,
    pub genre_links_added: usize,
    pub genre_links_removed: u64,
    pub credits_inserted: usize,
    pub credits_skipped: usize,
    pub credits_failed: usize,
    /// Movies whose credit list could not be fetched at all.
    pub credit_lists_failed: usize,
    pub people_created: usize,
    pub images_linked: usize,
    pub image_sync_failures: usize,
    pub downloads: Option<DownloadSummary>,
    pub elapsed: Duration,
}

impl SyncReport {
    pub(crate) fn record_reconcile(&mut self, outcome: &ReconcileOutcome) {
        self.movies_seen += 1;
        if outcome.created {
            self.movies_created += 1;
        }
        if outcome.details_fetched {
            self.details_fetched += 1;
        }
        self.genre_links_added += outcome.genres_added;
        self.genre_links_removed += outcome.genres_removed;
    }

    pub(crate) fn record_expand(&mut self, report: &ExpandReport) {
        self.credits_inserted += report.inserted;
        self.credits_skipped += report.skipped;
        self.credits_failed += report.failed;
        self.people_created += report.people_created;
    }

    /// Per-item failures that were isolated during the run.
    pub fn isolated_failures(&self) -> usize {
        self.credits_failed
            + self.credit_lists_failed
            + self.image_sync_failures
            + self.downloads.as_ref().map_or(0, |d| d.failed.len())
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} movies ({} new, {} detailed) from {} pages; \
             credits +{} ~{} !{}; people +{}; images linked {}",
            self.movies_seen,
            self.movies_created,
            self.details_fetched,
            self.pages_fetched,
            self.credits_inserted,
            self.credits_skipped,
            self.credits_failed,
            self.people_created,
            self.images_linked,
        )?;
        if let Some(downloads) = &self.downloads {
            write!(f, "; {downloads}")?;
        }
        Ok(())
    }
}
