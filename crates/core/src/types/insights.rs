//! Engagement statistics derived from the favourite ledger.
//!
//! Computing insights is two pure steps around one batch fetch:
//!
//! 1. [`FavouriteTally::from_favourites`] scans every favourite once, grouping
//!    item ids per user and counting favourites per item.
//! 2. The caller fetches the items named by [`FavouriteTally::item_ids`] in a
//!    single query.
//! 3. [`Insights::assemble`] joins the counts onto those items and sorts them.
//!
//! The whole computation is `O(F + I log I)` for `F` favourites and `I`
//! matched items. Nothing is cached; every call recomputes from current state.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::favourite::Favourite;
use super::id::ItemId;
use super::item::Item;
use super::user::AnonymousUserId;

/// Per-user grouping and per-item counts from one scan of the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavouriteTally {
    pub user_favourites: BTreeMap<AnonymousUserId, Vec<ItemId>>,
    pub item_counts: HashMap<ItemId, u64>,
    pub total_favourites: u64,
}

impl FavouriteTally {
    /// Build the tally in a single pass. Within each user, item ids keep the
    /// order in which the favourites were scanned.
    #[must_use]
    pub fn from_favourites<'a, I>(favourites: I) -> Self
    where
        I: IntoIterator<Item = &'a Favourite>,
    {
        let mut tally = Self::default();

        for favourite in favourites {
            tally
                .user_favourites
                .entry(favourite.anonymous_user_id.clone())
                .or_default()
                .push(favourite.item_id);
            *tally.item_counts.entry(favourite.item_id).or_insert(0) += 1;
            tally.total_favourites += 1;
        }

        tally
    }

    /// Distinct favourited item ids, sorted for a deterministic batch query.
    #[must_use]
    pub fn item_ids(&self) -> Vec<ItemId> {
        let mut ids: Vec<ItemId> = self.item_counts.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

/// An item annotated with how many users favourited it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavouritedItem {
    #[serde(flatten)]
    pub item: Item,
    pub favourite_count: u64,
}

/// Aggregate favourite statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    /// Item ids favourited by each anonymous user.
    pub user_favourites: BTreeMap<AnonymousUserId, Vec<ItemId>>,
    /// Every existing item with at least one favourite, most favourited first.
    pub most_favourited_items: Vec<FavouritedItem>,
    /// Number of favourite records.
    pub total_favourites: u64,
    /// Number of distinct anonymous users with at least one favourite.
    pub total_unique_users: u64,
}

impl Insights {
    /// Join the tally onto the fetched items.
    ///
    /// `items` is expected oldest first, as `get_many` returns them; ties in
    /// favourite count keep that order because the sort is stable. Items absent from the tally are
    /// ignored, and favourites whose item no longer exists still count
    /// towards the totals but produce no entry in `most_favourited_items`.
    #[must_use]
    pub fn assemble(tally: FavouriteTally, items: Vec<Item>) -> Self {
        let mut most_favourited_items: Vec<FavouritedItem> = items
            .into_iter()
            .filter_map(|item| {
                let favourite_count = *tally.item_counts.get(&item.id)?;
                Some(FavouritedItem {
                    item,
                    favourite_count,
                })
            })
            .collect();

        most_favourited_items.sort_by(|a, b| b.favourite_count.cmp(&a.favourite_count));

        Self {
            total_unique_users: tally.user_favourites.len() as u64,
            total_favourites: tally.total_favourites,
            user_favourites: tally.user_favourites,
            most_favourited_items,
        }
    }
}
