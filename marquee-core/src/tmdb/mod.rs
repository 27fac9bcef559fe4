//! TMDB access: the retrying client, its transport seam, and wire shapes.

pub mod client;
pub mod models;
pub mod transport;

pub use client::{RetryPolicy, TmdbClient};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, ReqwestTransport};
