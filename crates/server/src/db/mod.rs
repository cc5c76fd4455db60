//! Persistence for items and favourites.
//!
//! # Stores
//!
//! - [`PgStore`] - `PostgreSQL`, schema `catalog`
//! - [`MemoryStore`] - process-local, used when no database is configured and
//!   by the test suites
//!
//! Both enforce the same uniqueness rules: one item per slug and one
//! favourite per `(item_id, anonymous_user_id)`. A violated rule surfaces as
//! [`RepositoryError::Conflict`]; callers decide whether that is an error.
//!
//! ## Tables
//!
//! - `catalog.item` - Items, unique index on `slug`
//! - `catalog.favourite` - Favourites, unique index on `(item_id, anonymous_user_id)`
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p vitrine-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use vitrine_core::{
    AnonymousUserId, CategoryFilter, Favourite, Item, ItemChanges, ItemId, NewItem, Slug,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., duplicate slug or favourite).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Catalog item persistence.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Persist a validated item under `slug`.
    ///
    /// Returns `Err(RepositoryError::Conflict)` if the slug is taken.
    async fn insert(&self, item: &NewItem, slug: &Slug) -> Result<Item, RepositoryError>;

    /// Whether any item already uses `slug`.
    async fn slug_exists(&self, slug: &Slug) -> Result<bool, RepositoryError>;

    /// Get an item by its identifier.
    async fn get_by_id(&self, id: ItemId) -> Result<Option<Item>, RepositoryError>;

    /// Get an item by its slug.
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Item>, RepositoryError>;

    /// Fetch every existing item among `ids` in one call, oldest first.
    /// Unknown ids are skipped.
    async fn get_many(&self, ids: &[ItemId]) -> Result<Vec<Item>, RepositoryError>;

    /// List items newest first, optionally restricted to one category.
    async fn list(&self, filter: &CategoryFilter) -> Result<Vec<Item>, RepositoryError>;

    /// Distinct categories in use, sorted.
    async fn categories(&self) -> Result<Vec<String>, RepositoryError>;

    /// Apply a partial update. Returns `None` if the item does not exist.
    async fn update(
        &self,
        id: ItemId,
        changes: &ItemChanges,
    ) -> Result<Option<Item>, RepositoryError>;

    /// Remove an item. Returns `false` if it did not exist.
    async fn delete(&self, id: ItemId) -> Result<bool, RepositoryError>;

    /// Check that the backing store is reachable.
    async fn health_check(&self) -> Result<(), RepositoryError>;
}

/// Favourite ledger persistence.
#[async_trait]
pub trait FavouriteStore: Send + Sync {
    /// Look up the favourite for `(item_id, user)`.
    async fn find(
        &self,
        item_id: ItemId,
        user: &AnonymousUserId,
    ) -> Result<Option<Favourite>, RepositoryError>;

    /// Record a favourite.
    ///
    /// Returns `Err(RepositoryError::Conflict)` if one already exists for the
    /// pair; the store, not the caller, guarantees uniqueness.
    async fn insert(
        &self,
        item_id: ItemId,
        user: &AnonymousUserId,
    ) -> Result<Favourite, RepositoryError>;

    /// Remove the favourite for the pair. Returns `false` if none existed.
    async fn delete(&self, item_id: ItemId, user: &AnonymousUserId)
    -> Result<bool, RepositoryError>;

    /// All favourites of one user, oldest first.
    async fn list_for_user(
        &self,
        user: &AnonymousUserId,
    ) -> Result<Vec<Favourite>, RepositoryError>;

    /// Every favourite in the ledger, oldest first.
    async fn list_all(&self) -> Result<Vec<Favourite>, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
