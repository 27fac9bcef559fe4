//! Configuration loading for Marquee.
//!
//! Settings come from an optional TOML file layered under environment
//! variables. The TMDB credential is exposed through [`TokenProvider`] so the
//! API client never reads process-wide state.

pub mod error;
pub mod settings;
pub mod token;

pub use error::ConfigError;
pub use settings::{
    AppConfig, DEFAULT_CONFIG_FILE, DatabaseSettings, MAX_SYNC_INTERVAL,
    SyncSettings, TmdbSettings,
};
pub use token::{ApiToken, StaticToken, TokenProvider};
