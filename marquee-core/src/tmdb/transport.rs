use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use marquee_config::{ApiToken, ConfigError};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderValue};
use tracing::debug;
use url::Url;

use crate::error::{Result, SyncError, TransportError};

/// A GET against the catalog API, relative to the configured base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Bytes,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// `Authorization` header for `token`.
///
/// A token that cannot be sent as a header is a configuration problem, not a
/// transport one.
pub fn bearer_header(token: &ApiToken) -> Result<HeaderValue> {
    HeaderValue::from_str(&format!("Bearer {}", token.expose())).map_err(|_| {
        SyncError::Config(ConfigError::InvalidValue {
            field: "tmdb.api_token",
            message: "not a valid HTTP header value".into(),
        })
    })
}

/// One HTTP exchange, no retries. Retry policy lives in the client.
#[async_trait]
pub trait HttpTransport: Send + Sync + fmt::Debug {
    async fn get(
        &self,
        request: &ApiRequest,
        token: &ApiToken,
    ) -> std::result::Result<ApiResponse, TransportError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
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

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(
        &self,
        request: &ApiRequest,
        token: &ApiToken,
    ) -> std::result::Result<ApiResponse, TransportError> {
        let url = self.url_for(&request.path);
        let bearer = bearer_header(token)
            .map_err(|err| TransportError::new(err.to_string()))?;

        debug!(url = %url, query = ?request.query, "GET catalog API");

        let response = self
            .http
            .get(&url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, bearer)
            .query(&request.query)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(ApiResponse { status, body })
    }
}
