//! Favourite API route handlers.

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use vitrine_core::{AnonymousUserId, ResolvedFavourite, ToggleOutcome};

use super::parse_item_id;
use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavouritesQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleRequest {
    pub item_id: Option<String>,
    pub anonymous_user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FavouritesBody {
    pub favourites: Vec<ResolvedFavourite>,
}

fn parse_user(raw: &str) -> Result<AnonymousUserId> {
    AnonymousUserId::parse(raw).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Favourites of one anonymous user, joined to their items.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<FavouritesQuery>,
) -> Result<Json<FavouritesBody>> {
    let raw = query
        .user_id
        .ok_or_else(|| AppError::BadRequest("userId is required".to_string()))?;
    let user = parse_user(&raw)?;

    let favourites = state.favourites().list_resolved(&user).await?;
    Ok(Json(FavouritesBody { favourites }))
}

/// Toggle a favourite for `(itemId, anonymousUserId)`.
pub async fn toggle(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ToggleRequest>, JsonRejection>,
) -> Result<Json<ToggleOutcome>> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let (Some(item_id), Some(user)) = (request.item_id, request.anonymous_user_id) else {
        return Err(AppError::BadRequest(
            "itemId and anonymousUserId are required".to_string(),
        ));
    };

    let item_id = parse_item_id(&item_id)?;
    let user = parse_user(&user)?;

    let outcome = state.favourites().toggle(item_id, &user).await?;
    Ok(Json(outcome))
}
