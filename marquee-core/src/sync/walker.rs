use std::time::Duration;

use tracing::{debug, info};

use crate::error::Result;
use crate::tmdb::TmdbClient;
use crate::tmdb::models::DiscoverMovie;

/// Aggregated discovery walk.
#[derive(Debug, Clone, Default)]
pub struct DiscoverWalk {
    pub movies: Vec<DiscoverMovie>,
    pub pages_fetched: u32,
    pub total_pages: u32,
}

/// Walks `/discover/movie` page by page up to a fixed cap.
#[derive(Debug, Clone)]
pub struct PageWalker {
    client: TmdbClient,
    page_cap: u32,
    page_delay: Duration,
}

impl PageWalker {
    pub fn new(client: TmdbClient, page_cap: u32, page_delay: Duration) -> Self {
        Self {
            client,
            page_cap: page_cap.max(1),
            page_delay,
        }
    }

    /// Fetch pages `1..=min(total_pages, cap)` in order, where
    /// `total_pages` is taken from the most recent response.
    ///
    /// Any page error aborts the walk; results from earlier pages are
    /// discarded with it.
    pub async fn discover(&self, sort_by: &str) -> Result<DiscoverWalk> {
        let mut walk = DiscoverWalk::default();
        let mut last_page = 1;
        let mut page = 1;

        while page <= last_page {
            if page > 1 {
                tokio::time::sleep(self.page_delay).await;
            }

            let response = self.client.discover_movies(page, sort_by).await?;
            // The listing can shrink while it is walked.
            walk.total_pages = response.total_pages;
            last_page = response.total_pages.min(self.page_cap);
            debug!(
                page,
                last_page,
                results = response.results.len(),
                "discover page fetched"
            );

            walk.movies.extend(response.results);
            walk.pages_fetched = page;
            page += 1;
        }

        info!(
            pages = walk.pages_fetched,
            total_pages = walk.total_pages,
            movies = walk.movies.len(),
            "discovery walk complete"
        );
        Ok(walk)
    }
}
