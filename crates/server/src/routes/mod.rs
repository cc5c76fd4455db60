//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /item/{slug}               - Public share page (HTML)
//!
//! # Items
//! GET    /api/items?category=       - List items, newest first
//! POST   /api/items                 - Create item
//! GET    /api/items/{id}            - Get item
//! PUT    /api/items/{id}            - Partial update (PATCH also accepted)
//! DELETE /api/items/{id}            - Delete item and its hosted media
//! GET    /api/items/by-slug/{slug}  - Get item by slug
//! GET    /api/categories            - Distinct categories
//!
//! # Favourites
//! GET    /api/favourites?userId=    - Resolved favourites of one user
//! POST   /api/favourites            - Toggle a favourite
//!
//! # Media
//! POST   /api/upload                - Multipart upload of `file` fields
//!
//! # Admin
//! GET    /api/admin/insights        - Favourite statistics
//! POST   /api/admin/login           - Placeholder login
//! ```

pub mod admin;
pub mod favourites;
pub mod items;
pub mod share;
pub mod upload;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use vitrine_core::ItemId;

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::state::AppState;

/// Create the item routes router.
pub fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(items::index).post(items::create))
        .route("/by-slug/{slug}", get(items::show_by_slug))
        .route(
            "/{id}",
            get(items::show)
                .put(items::update)
                .patch(items::update)
                .delete(items::destroy),
        )
}

/// Create the admin API routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/insights", get(admin::insights))
        .route("/login", post(admin::login))
}

/// Create all routes for the server.
pub fn routes(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        // Public share page
        .route("/item/{slug}", get(share::show))
        // Item API
        .nest("/api/items", item_routes())
        .route("/api/categories", get(items::categories))
        // Favourites API
        .route(
            "/api/favourites",
            get(favourites::index).post(favourites::toggle),
        )
        // Media upload
        .route(
            "/api/upload",
            post(upload::upload).layer(DefaultBodyLimit::max(config.max_upload_bytes)),
        )
        // Admin API
        .nest("/api/admin", admin_routes())
}

/// Parse an item id from a path segment.
fn parse_item_id(raw: &str) -> Result<ItemId, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("invalid item id: {raw}")))
}
