//! Favourite ledger: toggle and per-user listing.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, instrument};
use vitrine_core::{AnonymousUserId, Item, ItemId, ResolvedFavourite, ToggleOutcome};

use super::ServiceError;
use crate::db::{FavouriteStore, ItemStore, RepositoryError};

/// Favourite operations.
#[derive(Clone)]
pub struct FavouriteService {
    favourites: Arc<dyn FavouriteStore>,
    items: Arc<dyn ItemStore>,
}

impl FavouriteService {
    #[must_use]
    pub fn new(favourites: Arc<dyn FavouriteStore>, items: Arc<dyn ItemStore>) -> Self {
        Self { favourites, items }
    }

    /// Flip membership of `(item_id, user)` in the ledger.
    ///
    /// Two concurrent toggles from the absent state can both decide to
    /// insert. The store's unique index rejects the second, and that
    /// conflict means the pair is favourited, which is what both callers
    /// asked for. Likewise a delete that finds nothing means another call
    /// already removed it.
    ///
    /// # Errors
    ///
    /// Returns error only if the store itself fails.
    #[instrument(skip(self, user), fields(item = %item_id, user = %user))]
    pub async fn toggle(
        &self,
        item_id: ItemId,
        user: &AnonymousUserId,
    ) -> Result<ToggleOutcome, ServiceError> {
        if self.favourites.find(item_id, user).await?.is_some() {
            if !self.favourites.delete(item_id, user).await? {
                debug!("Favourite already removed");
            }
            return Ok(ToggleOutcome::REMOVED);
        }

        match self.favourites.insert(item_id, user).await {
            Ok(_) => Ok(ToggleOutcome::ADDED),
            Err(RepositoryError::Conflict(_)) => {
                debug!("Favourite created concurrently");
                Ok(ToggleOutcome::ADDED)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// All favourites of `user`, oldest first, each joined to its item.
    ///
    /// Favourites whose item has since been deleted are left out.
    ///
    /// # Errors
    ///
    /// Returns error if a store fails.
    #[instrument(skip(self, user), fields(user = %user))]
    pub async fn list_resolved(
        &self,
        user: &AnonymousUserId,
    ) -> Result<Vec<ResolvedFavourite>, ServiceError> {
        let favourites = self.favourites.list_for_user(user).await?;
        if favourites.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<ItemId> = favourites.iter().map(|f| f.item_id).collect();
        let items: HashMap<ItemId, Item> = self
            .items
            .get_many(&ids)
            .await?
            .into_iter()
            .map(|item| (item.id, item))
            .collect();

        Ok(favourites
            .into_iter()
            .filter_map(|favourite| {
                let Some(item) = items.get(&favourite.item_id) else {
                    debug!(item = %favourite.item_id, "Skipping favourite of deleted item");
                    return None;
                };
                Some(ResolvedFavourite::new(favourite, item.clone()))
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn service() -> (FavouriteService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let service = FavouriteService::new(store.clone(), store.clone());
        (service, store)
    }

    #[tokio::test]
    async fn test_toggle_flips_membership() {
        let (service, store) = service();
        let user = AnonymousUserId::parse("user_1_abc").unwrap();
        let item = ItemId::generate();

        for expected in [true, false, true, false, true] {
            let outcome = service.toggle(item, &user).await.unwrap();
            assert_eq!(outcome.favourited, expected);
            assert!(store.list_all().await.unwrap().len() <= 1);
        }
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_toggle_is_per_user() {
        let (service, store) = service();
        let alice = AnonymousUserId::parse("user_1_alice").unwrap();
        let bob = AnonymousUserId::parse("user_2_bob").unwrap();
        let item = ItemId::generate();

        assert!(service.toggle(item, &alice).await.unwrap().favourited);
        assert!(service.toggle(item, &bob).await.unwrap().favourited);
        assert_eq!(store.list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_resolved_empty_user() {
        let (service, _) = service();
        let user = AnonymousUserId::parse("user_1_nobody").unwrap();
        assert!(service.list_resolved(&user).await.unwrap().is_empty());
    }
}
