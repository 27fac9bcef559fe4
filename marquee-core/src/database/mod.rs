//! Storage ports and their adapters.

pub mod memory;
pub mod ports;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::{CatalogCounts, InMemoryCatalog};
pub use ports::{
    CatalogRepository, CreditRepository, FindOrCreate, GenreRepository,
    ImageRepository, MovieRepository, PeopleRepository,
};
#[cfg(feature = "postgres")]
pub use postgres::{MIGRATOR, PostgresCatalog};
