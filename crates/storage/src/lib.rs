#![forbid(unsafe_code)]

pub mod repository;
pub mod seed;

pub use repository::{
    Catalog, CatalogRepository, InMemoryRepository, LearnerRepository, Storage, StorageError,
};
