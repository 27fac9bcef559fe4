use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use marquee_config::{SyncSettings, TmdbSettings, TokenProvider};
use marquee_model::{CreditId, MovieId, PersonId};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{Result, SyncError};
use crate::tmdb::models::{
    CreditDetails, DiscoverMovie, DiscoverPage, GenreList, MovieCredits,
    MovieDetailsResponse, MovieImages, PersonResponse,
};
use crate::tmdb::transport::{
    ApiRequest, HttpTransport, ReqwestTransport, bearer_header,
};

/// Retry schedule for transport failures: attempt `n` (1-based) that fails
/// is followed by a sleep of `n * base_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// Authenticated TMDB client with bounded retry on transport failure.
///
/// Non-2xx responses are returned as [`SyncError::RemoteStatus`] straight
/// away; only failures where no response arrived are retried.
#[derive(Debug, Clone)]
pub struct TmdbClient {
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<dyn TokenProvider>,
    retry: RetryPolicy,
    language: String,
}

impl TmdbClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        tokens: Arc<dyn TokenProvider>,
        retry: RetryPolicy,
        language: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            tokens,
            retry,
            language: language.into(),
        }
    }

    /// Build a client backed by `reqwest` from loaded settings.
    pub fn from_settings(
        tmdb: &TmdbSettings,
        sync: &SyncSettings,
    ) -> Result<Self> {
        let transport =
            ReqwestTransport::new(&tmdb.api_base_url, sync.request_timeout)?;
        Ok(Self::new(
            Arc::new(transport),
            Arc::new(tmdb.clone()),
            RetryPolicy::new(sync.max_retries, sync.retry_base_delay),
            tmdb.language.clone(),
        ))
    }

    /// Raw GET returning the response body.
    pub async fn fetch(&self, request: &ApiRequest) -> Result<Bytes> {
        let token = self.tokens.api_token()?;
        bearer_header(&token)?;

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.transport.get(request, &token).await {
                Ok(response) if response.is_success() => {
                    debug!(
                        path = %request.path,
                        attempt,
                        bytes = response.body.len(),
                        "catalog request succeeded"
                    );
                    return Ok(response.body);
                }
                Ok(response) => {
                    debug!(
                        path = %request.path,
                        status = response.status,
                        "catalog request rejected"
                    );
                    return Err(SyncError::RemoteStatus {
                        code: response.status,
                    });
                }
                Err(err) if attempt <= self.retry.max_retries => {
                    let delay = self.retry.delay_after(attempt);
                    warn!(
                        path = %request.path,
                        attempt,
                        timed_out = err.is_timeout(),
                        delay_ms = delay.as_millis() as u64,
                        "transport failure, retrying: {err}"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    return Err(SyncError::Transport {
                        attempts: attempt,
                        source: err,
                    });
                }
            }
        }
    }

    async fn get_json<T>(&self, request: ApiRequest) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let body = self.fetch(&request).await?;
        serde_json::from_slice(&body)
            .map_err(|err| SyncError::decode(request.path.clone(), err))
    }

    pub async fn discover_movies(
        &self,
        page: u32,
        sort_by: &str,
    ) -> Result<DiscoverPage<DiscoverMovie>> {
        let request = ApiRequest::new("/discover/movie")
            .param("include_adult", false)
            .param("include_video", false)
            .param("language", &self.language)
            .param("page", page.max(1))
            .param("sort_by", sort_by);
        self.get_json(request).await
    }

    pub async fn movie_genres(&self) -> Result<GenreList> {
        let request =
            ApiRequest::new("/genre/movie/list").param("language", &self.language);
        self.get_json(request).await
    }

    pub async fn movie_details(
        &self,
        id: MovieId,
    ) -> Result<MovieDetailsResponse> {
        let request = ApiRequest::new(format!("/movie/{id}"))
            .param("language", &self.language);
        self.get_json(request).await
    }

    pub async fn movie_credits(&self, id: MovieId) -> Result<MovieCredits> {
        let request = ApiRequest::new(format!("/movie/{id}/credits"))
            .param("language", &self.language);
        self.get_json(request).await
    }

    pub async fn credit(&self, id: &CreditId) -> Result<CreditDetails> {
        self.get_json(ApiRequest::new(format!("/credit/{id}"))).await
    }

    pub async fn person(&self, id: PersonId) -> Result<PersonResponse> {
        let request = ApiRequest::new(format!("/person/{id}"))
            .param("language", &self.language);
        self.get_json(request).await
    }

    /// Images are requested without a language filter so that
    /// language-neutral artwork is included.
    pub async fn movie_images(&self, id: MovieId) -> Result<MovieImages> {
        self.get_json(ApiRequest::new(format!("/movie/{id}/images")))
            .await
    }
}
