//! Business logic sitting between the route handlers and the stores.
//!
//! Services hold trait objects only, so the same code runs against
//! `PostgreSQL`, the in-memory store, or test doubles.

pub mod catalog;
pub mod favourites;
pub mod insights;
pub mod uploads;

use thiserror::Error;
use vitrine_core::ValidationError;

use crate::db::RepositoryError;

pub use catalog::CatalogService;
pub use favourites::FavouriteService;
pub use insights::InsightsService;
pub use uploads::UploadService;

/// Errors returned by the services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Store operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Item does not exist.
    #[error("item not found")]
    ItemNotFound,

    /// Every generated slug collided.
    #[error("could not find a free slug for '{base}' after {attempts} attempts")]
    SlugExhausted { base: String, attempts: usize },
}
