//! Engagement statistics over the favourite ledger.

use std::sync::Arc;

use tracing::{debug, instrument};
use vitrine_core::{FavouriteTally, Insights};

use super::ServiceError;
use crate::db::{FavouriteStore, ItemStore};

/// Computes [`Insights`] on demand. Nothing is cached between calls.
#[derive(Clone)]
pub struct InsightsService {
    favourites: Arc<dyn FavouriteStore>,
    items: Arc<dyn ItemStore>,
}

impl InsightsService {
    #[must_use]
    pub fn new(favourites: Arc<dyn FavouriteStore>, items: Arc<dyn ItemStore>) -> Self {
        Self { favourites, items }
    }

    /// One scan of the ledger, one batch fetch of the favourited items, then
    /// a join and a sort.
    ///
    /// # Errors
    ///
    /// Returns error if a store fails.
    #[instrument(skip(self))]
    pub async fn compute(&self) -> Result<Insights, ServiceError> {
        let favourites = self.favourites.list_all().await?;
        let tally = FavouriteTally::from_favourites(&favourites);

        let ids = tally.item_ids();
        let items = if ids.is_empty() {
            Vec::new()
        } else {
            self.items.get_many(&ids).await?
        };

        let insights = Insights::assemble(tally, items);
        debug!(
            total_favourites = insights.total_favourites,
            total_unique_users = insights.total_unique_users,
            items = insights.most_favourited_items.len(),
            "Computed insights"
        );
        Ok(insights)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use vitrine_core::{AnonymousUserId, ItemId, NewItem, Price, Slug};

    use super::*;
    use crate::db::MemoryStore;

    #[tokio::test]
    async fn test_orphaned_favourites_count_but_are_not_listed() {
        let store = Arc::new(MemoryStore::new());
        let item = ItemStore::insert(
            store.as_ref(),
            &NewItem {
                name: "Vase".to_string(),
                description: String::new(),
                price: Price::new(Decimal::TEN).unwrap(),
                category: "decor".to_string(),
                media: Vec::new(),
            },
            &Slug::from_stored("vase-0a0a0a"),
        )
        .await
        .unwrap();

        let user = AnonymousUserId::parse("user_1_x").unwrap();
        FavouriteStore::insert(store.as_ref(), item.id, &user)
            .await
            .unwrap();
        FavouriteStore::insert(store.as_ref(), ItemId::generate(), &user)
            .await
            .unwrap();

        let insights = InsightsService::new(store.clone(), store.clone())
            .compute()
            .await
            .unwrap();

        assert_eq!(insights.total_favourites, 2);
        assert_eq!(insights.total_unique_users, 1);
        assert_eq!(insights.most_favourited_items.len(), 1);
        assert_eq!(insights.most_favourited_items[0].item.id, item.id);
        assert_eq!(insights.user_favourites[&user].len(), 2);
    }
}
