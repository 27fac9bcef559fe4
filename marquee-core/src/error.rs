use marquee_config::ConfigError;
use thiserror::Error;

/// Transport-level failure (connect, timeout, broken body) from an HTTP call.
///
/// These are the only failures the API client retries.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    timed_out: bool,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: true,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.timed_out
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self {
            timed_out: err.is_timeout(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("transport failed after {attempts} attempt(s): {source}")]
    Transport {
        attempts: u32,
        #[source]
        source: TransportError,
    },

    #[error("remote returned HTTP {code}")]
    RemoteStatus { code: u16 },

    #[error("failed to decode {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid asset path: {0:?}")]
    InvalidAsset(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

impl SyncError {
    pub fn decode(context: impl Into<String>, source: serde_json::Error) -> Self {
        SyncError::Decode {
            context: context.into(),
            source,
        }
    }

    /// HTTP status carried by the error, if the remote answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            SyncError::RemoteStatus { code } => Some(*code),
            _ => None,
        }
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for SyncError {
    fn from(err: sqlx::Error) -> Self {
        SyncError::Storage(err.to_string())
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::migrate::MigrateError> for SyncError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        SyncError::Storage(format!("migration failed: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
