use std::fmt;

use zeroize::Zeroizing;

use crate::error::ConfigError;

/// Bearer token for the TMDB v4 read-access API.
///
/// The backing buffer is wiped on drop and never printed by `Debug`.
#[derive(Clone)]
pub struct ApiToken(Zeroizing<String>);

impl ApiToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(<redacted>)")
    }
}

/// Source of the catalog API credential, injected into the API client.
pub trait TokenProvider: Send + Sync + fmt::Debug {
    fn api_token(&self) -> Result<ApiToken, ConfigError>;
}

/// Fixed token, useful for tests and one-off tooling.
#[derive(Debug, Clone)]
pub struct StaticToken(Option<ApiToken>);

impl StaticToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Some(ApiToken::new(value)))
    }

    /// A provider that always reports a missing credential.
    pub fn missing() -> Self {
        Self(None)
    }
}

impl TokenProvider for StaticToken {
    fn api_token(&self) -> Result<ApiToken, ConfigError> {
        match &self.0 {
            Some(token) if !token.is_empty() => Ok(token.clone()),
            _ => Err(ConfigError::MissingToken),
        }
    }
}
