//! Favourite commands, talking to a running server.
//!
//! # Usage
//!
//! ```bash
//! vitrine favourite toggle 6f1c2a4e-8d3b-4c5a-9e7f-0a1b2c3d4e5f
//! vitrine favourite list
//! ```

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vitrine_core::{AnonymousUserId, ItemId, ResolvedFavourite, ToggleOutcome};

/// Errors talking to the server.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ToggleRequest<'a> {
    item_id: ItemId,
    anonymous_user_id: &'a AnonymousUserId,
}

#[derive(Deserialize)]
struct FavouritesBody {
    favourites: Vec<ResolvedFavourite>,
}

/// Minimal client for the favourite endpoints.
#[derive(Debug, Clone)]
pub struct FavouriteClient {
    client: Client,
    base: Url,
}

impl FavouriteClient {
    /// Create a client for the server at `base`.
    ///
    /// # Errors
    ///
    /// Returns error if `base` is not a URL or the HTTP client fails to build.
    pub fn new(base: &str) -> Result<Self, ApiError> {
        let mut base = Url::parse(base)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            client: Client::builder().build()?,
            base,
        })
    }

    fn favourites_url(&self) -> Result<Url, ApiError> {
        Ok(self.base.join("api/favourites")?)
    }

    /// Flip the favourite for `item_id`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the server rejects it.
    pub async fn toggle(
        &self,
        item_id: ItemId,
        user: &AnonymousUserId,
    ) -> Result<ToggleOutcome, ApiError> {
        let response = self
            .client
            .post(self.favourites_url()?)
            .json(&ToggleRequest {
                item_id,
                anonymous_user_id: user,
            })
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// Favourites of `user`, joined to their items.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the server rejects it.
    pub async fn list(&self, user: &AnonymousUserId) -> Result<Vec<ResolvedFavourite>, ApiError> {
        let mut url = self.favourites_url()?;
        url.query_pairs_mut().append_pair("userId", user.as_str());

        let response = self.client.get(url).send().await?;
        let body: FavouritesBody = check(response).await?.json().await?;
        Ok(body.favourites)
    }
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(ApiError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_favourites_url_keeps_base_path() {
        let client = FavouriteClient::new("http://localhost:3000/shop").unwrap();
        assert_eq!(
            client.favourites_url().unwrap().as_str(),
            "http://localhost:3000/shop/api/favourites"
        );
    }

    #[test]
    fn test_toggle_request_wire_format() {
        let user = AnonymousUserId::parse("user_1_abc").unwrap();
        let item_id: ItemId = "6f1c2a4e-8d3b-4c5a-9e7f-0a1b2c3d4e5f".parse().unwrap();
        let json = serde_json::to_value(ToggleRequest {
            item_id,
            anonymous_user_id: &user,
        })
        .unwrap();

        assert_eq!(json["itemId"], "6f1c2a4e-8d3b-4c5a-9e7f-0a1b2c3d4e5f");
        assert_eq!(json["anonymousUserId"], "user_1_abc");
    }
}
