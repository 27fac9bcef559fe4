//! Marquee ingestion pipeline.
//!
//! Mirrors the TMDB movie catalogue into local storage. A run walks the
//! discovery listing, reconciles each movie by its TMDB id, expands credits
//! and people, records image metadata, and finally downloads image assets
//! under a concurrency ceiling. [`sync::SyncScheduler`] is the entry point
//! for both one-off and periodic runs.

pub mod database;
pub mod error;
pub mod sync;
pub mod tmdb;

#[cfg(test)]
mod test_server;

#[cfg(feature = "postgres")]
pub use database::MIGRATOR;
pub use error::{Result, SyncError, TransportError};
