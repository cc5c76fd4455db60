//! Public share page for a single item.

use askama::Template;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use vitrine_core::{Item, MediaKind};

use crate::error::AppError;
use crate::services::ServiceError;
use crate::state::AppState;

const DEFAULT_DESCRIPTION: &str = "Check out this item";

/// One media entry as rendered on the page.
pub struct MediaView {
    pub url: String,
    pub is_video: bool,
}

#[derive(Template)]
#[template(path = "item.html")]
pub struct ItemPageTemplate {
    pub name: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub image: Option<String>,
    pub media: Vec<MediaView>,
    pub share_url: String,
}

impl ItemPageTemplate {
    fn new(item: Item, share_url: String) -> Self {
        let description = if item.description.trim().is_empty() {
            DEFAULT_DESCRIPTION.to_string()
        } else {
            item.description.clone()
        };

        Self {
            image: item.cover_image().map(|m| m.url.clone()),
            price: item.price.to_string(),
            media: item
                .media
                .into_iter()
                .map(|m| MediaView {
                    is_video: m.kind == MediaKind::Video,
                    url: m.url,
                })
                .collect(),
            name: item.name,
            description,
            category: item.category,
            share_url,
        }
    }
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate;

fn render(template: &impl Template) -> Result<String, AppError> {
    template
        .render()
        .map_err(|e| AppError::Internal(format!("template render failed: {e}")))
}

/// Render the share page, or a 404 page for an unknown slug.
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    match state.catalog().get_by_slug(&slug).await {
        Ok(item) => {
            let share_url = state.config().share_url(&item.slug);
            let page = render(&ItemPageTemplate::new(item, share_url))?;
            Ok(Html(page).into_response())
        }
        Err(ServiceError::ItemNotFound) => {
            let page = render(&NotFoundTemplate)?;
            Ok((StatusCode::NOT_FOUND, Html(page)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}
