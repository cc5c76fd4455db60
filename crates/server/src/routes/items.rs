//! Item API route handlers.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use vitrine_core::{CategoryFilter, Item, ItemPatch, NewItemInput};

use super::parse_item_id;
use crate::config::ServerConfig;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// An item as returned by the API, with its public link.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    #[serde(flatten)]
    pub item: Item,
    pub share_url: String,
}

impl ItemResponse {
    #[must_use]
    pub fn new(item: Item, config: &ServerConfig) -> Self {
        let share_url = config.share_url(&item.slug);
        Self { item, share_url }
    }
}

#[derive(Debug, Serialize)]
pub struct ItemsBody {
    pub items: Vec<ItemResponse>,
}

#[derive(Debug, Serialize)]
pub struct ItemBody {
    pub item: ItemResponse,
}

#[derive(Debug, Serialize)]
pub struct CategoriesBody {
    pub categories: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DeletedBody {
    pub success: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
}

/// List items, newest first. `category=all` or no category lists everything.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ItemsBody>> {
    let filter = CategoryFilter::from_query(query.category.as_deref());
    let items = state.catalog().list(&filter).await?;

    Ok(Json(ItemsBody {
        items: items
            .into_iter()
            .map(|item| ItemResponse::new(item, state.config()))
            .collect(),
    }))
}

/// Create an item.
pub async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewItemInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ItemBody>)> {
    let Json(input) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let item = state.catalog().create(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(ItemBody {
            item: ItemResponse::new(item, state.config()),
        }),
    ))
}

/// Get an item by id.
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<ItemBody>> {
    let item = state.catalog().get(parse_item_id(&id)?).await?;
    Ok(Json(ItemBody {
        item: ItemResponse::new(item, state.config()),
    }))
}

/// Get an item by slug.
pub async fn show_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ItemBody>> {
    let item = state.catalog().get_by_slug(&slug).await?;
    Ok(Json(ItemBody {
        item: ItemResponse::new(item, state.config()),
    }))
}

/// Apply a partial update.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<ItemPatch>, JsonRejection>,
) -> Result<Json<ItemBody>> {
    let id = parse_item_id(&id)?;
    let Json(patch) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let item = state.catalog().update(id, patch).await?;

    Ok(Json(ItemBody {
        item: ItemResponse::new(item, state.config()),
    }))
}

/// Delete an item and its hosted media.
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedBody>> {
    state.catalog().delete(parse_item_id(&id)?).await?;
    Ok(Json(DeletedBody { success: true }))
}

/// Distinct categories in use.
pub async fn categories(State(state): State<AppState>) -> Result<Json<CategoriesBody>> {
    Ok(Json(CategoriesBody {
        categories: state.catalog().categories().await?,
    }))
}
