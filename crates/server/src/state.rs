//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::db::{FavouriteStore, ItemStore};
use crate::media::MediaGateway;
use crate::services::{CatalogService, FavouriteService, InsightsService, UploadService};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Stores and the media gateway are trait
/// objects, so the same router runs on `PostgreSQL` or in memory.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    items: Arc<dyn ItemStore>,
    catalog: CatalogService,
    favourites: FavouriteService,
    insights: InsightsService,
    uploads: UploadService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `items` - Item store
    /// * `favourites` - Favourite store
    /// * `media` - Media host gateway
    #[must_use]
    pub fn new(
        config: ServerConfig,
        items: Arc<dyn ItemStore>,
        favourites: Arc<dyn FavouriteStore>,
        media: Arc<dyn MediaGateway>,
    ) -> Self {
        let catalog = CatalogService::new(Arc::clone(&items), Arc::clone(&media));
        let favourite_service = FavouriteService::new(Arc::clone(&favourites), Arc::clone(&items));
        let insights = InsightsService::new(favourites, Arc::clone(&items));
        let uploads = UploadService::new(media);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                items,
                catalog,
                favourites: favourite_service,
                insights,
                uploads,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get the item store (used by the readiness check).
    #[must_use]
    pub fn items(&self) -> &Arc<dyn ItemStore> {
        &self.inner.items
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    #[must_use]
    pub fn favourites(&self) -> &FavouriteService {
        &self.inner.favourites
    }

    #[must_use]
    pub fn insights(&self) -> &InsightsService {
        &self.inner.insights
    }

    #[must_use]
    pub fn uploads(&self) -> &UploadService {
        &self.inner.uploads
    }
}
