//! Catalog data model shared across Marquee crates.
//!
//! Types here are plain records: movies, genres, people, credits and images
//! as they are stored locally, keyed by the identifiers TMDB assigns.

pub mod ids;
pub mod image;
pub mod movie;
pub mod people;

pub use ids::{CreditId, GenreId, MovieId, PersonId};
pub use image::{AssetRef, Image, ImageKind};
pub use movie::{Movie, MovieDetails, MovieSummary};
pub use people::{Credit, CreditKind, Genre, Person};
