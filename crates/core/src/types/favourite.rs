//! Favourites: (item, anonymous user) bookmarks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::ItemId;
use super::item::Item;
use super::user::AnonymousUserId;

/// A single bookmark. At most one exists per `(item_id, anonymous_user_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favourite {
    pub item_id: ItemId,
    pub anonymous_user_id: AnonymousUserId,
    pub created_at: DateTime<Utc>,
}

/// A favourite joined to the item it points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedFavourite {
    pub item_id: ItemId,
    pub anonymous_user_id: AnonymousUserId,
    pub created_at: DateTime<Utc>,
    pub item: Item,
}

impl ResolvedFavourite {
    /// Join a favourite to its item.
    #[must_use]
    pub fn new(favourite: Favourite, item: Item) -> Self {
        Self {
            item_id: favourite.item_id,
            anonymous_user_id: favourite.anonymous_user_id,
            created_at: favourite.created_at,
            item,
        }
    }
}

/// Result of flipping a favourite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleOutcome {
    /// Membership after the toggle.
    pub favourited: bool,
}

impl ToggleOutcome {
    pub const ADDED: Self = Self { favourited: true };
    pub const REMOVED: Self = Self { favourited: false };
}
