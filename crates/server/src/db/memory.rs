//! In-memory implementation of the item and favourite stores.
//!
//! Used when the server runs without a database and by the test suites. It
//! enforces the same uniqueness rules as the `PostgreSQL` indexes, checked
//! under the write lock so concurrent inserts cannot both succeed.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use vitrine_core::{
    AnonymousUserId, CategoryFilter, Favourite, Item, ItemChanges, ItemId, NewItem, Slug,
};

use super::{FavouriteStore, ItemStore, RepositoryError};

/// Process-local store. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Tables>>,
}

/// Rows in insertion order.
#[derive(Default)]
struct Tables {
    items: Vec<Item>,
    favourites: Vec<Favourite>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn insert(&self, item: &NewItem, slug: &Slug) -> Result<Item, RepositoryError> {
        let mut tables = self.inner.write().await;
        if tables.items.iter().any(|existing| &existing.slug == slug) {
            return Err(RepositoryError::Conflict("slug already exists".to_owned()));
        }

        let now = Utc::now();
        let item = Item {
            id: ItemId::generate(),
            slug: slug.clone(),
            name: item.name.clone(),
            description: item.description.clone(),
            price: item.price,
            category: item.category.clone(),
            media: item.media.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.items.push(item.clone());
        Ok(item)
    }

    async fn slug_exists(&self, slug: &Slug) -> Result<bool, RepositoryError> {
        let tables = self.inner.read().await;
        Ok(tables.items.iter().any(|item| &item.slug == slug))
    }

    async fn get_by_id(&self, id: ItemId) -> Result<Option<Item>, RepositoryError> {
        let tables = self.inner.read().await;
        Ok(tables.items.iter().find(|item| item.id == id).cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Item>, RepositoryError> {
        let tables = self.inner.read().await;
        Ok(tables
            .items
            .iter()
            .find(|item| item.slug.as_str() == slug)
            .cloned())
    }

    async fn get_many(&self, ids: &[ItemId]) -> Result<Vec<Item>, RepositoryError> {
        let wanted: HashSet<&ItemId> = ids.iter().collect();
        let tables = self.inner.read().await;
        Ok(tables
            .items
            .iter()
            .filter(|item| wanted.contains(&item.id))
            .cloned()
            .collect())
    }

    async fn list(&self, filter: &CategoryFilter) -> Result<Vec<Item>, RepositoryError> {
        let tables = self.inner.read().await;
        // Reverse insertion order first so equal timestamps still list newest first.
        let mut items: Vec<Item> = tables
            .items
            .iter()
            .rev()
            .filter(|item| filter.matches(&item.category))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn categories(&self) -> Result<Vec<String>, RepositoryError> {
        let tables = self.inner.read().await;
        let mut categories: Vec<String> = tables
            .items
            .iter()
            .map(|item| item.category.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        categories.sort();
        Ok(categories)
    }

    async fn update(
        &self,
        id: ItemId,
        changes: &ItemChanges,
    ) -> Result<Option<Item>, RepositoryError> {
        let mut tables = self.inner.write().await;
        let Some(item) = tables.items.iter_mut().find(|item| item.id == id) else {
            return Ok(None);
        };
        changes.apply(item, Utc::now());
        Ok(Some(item.clone()))
    }

    async fn delete(&self, id: ItemId) -> Result<bool, RepositoryError> {
        let mut tables = self.inner.write().await;
        let before = tables.items.len();
        tables.items.retain(|item| item.id != id);
        Ok(tables.items.len() < before)
    }

    async fn health_check(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[async_trait]
impl FavouriteStore for MemoryStore {
    async fn find(
        &self,
        item_id: ItemId,
        user: &AnonymousUserId,
    ) -> Result<Option<Favourite>, RepositoryError> {
        let tables = self.inner.read().await;
        Ok(tables
            .favourites
            .iter()
            .find(|f| f.item_id == item_id && &f.anonymous_user_id == user)
            .cloned())
    }

    async fn insert(
        &self,
        item_id: ItemId,
        user: &AnonymousUserId,
    ) -> Result<Favourite, RepositoryError> {
        let mut tables = self.inner.write().await;
        if tables
            .favourites
            .iter()
            .any(|f| f.item_id == item_id && &f.anonymous_user_id == user)
        {
            return Err(RepositoryError::Conflict(
                "favourite already exists".to_owned(),
            ));
        }

        let favourite = Favourite {
            item_id,
            anonymous_user_id: user.clone(),
            created_at: Utc::now(),
        };
        tables.favourites.push(favourite.clone());
        Ok(favourite)
    }

    async fn delete(
        &self,
        item_id: ItemId,
        user: &AnonymousUserId,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.inner.write().await;
        let before = tables.favourites.len();
        tables
            .favourites
            .retain(|f| !(f.item_id == item_id && &f.anonymous_user_id == user));
        Ok(tables.favourites.len() < before)
    }

    async fn list_for_user(
        &self,
        user: &AnonymousUserId,
    ) -> Result<Vec<Favourite>, RepositoryError> {
        let tables = self.inner.read().await;
        Ok(tables
            .favourites
            .iter()
            .filter(|f| &f.anonymous_user_id == user)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Favourite>, RepositoryError> {
        Ok(self.inner.read().await.favourites.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use vitrine_core::Price;

    use super::*;

    fn new_item(name: &str, category: &str) -> NewItem {
        NewItem {
            name: name.to_owned(),
            description: String::new(),
            price: Price::new(Decimal::ONE).unwrap(),
            category: category.to_owned(),
            media: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_slug_conflicts() {
        let store = MemoryStore::new();
        let slug = Slug::from_stored("mug-000000");
        ItemStore::insert(&store, &new_item("Mug", "mugs"), &slug)
            .await
            .unwrap();

        let err = ItemStore::insert(&store, &new_item("Mug", "mugs"), &slug)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert!(store.slug_exists(&slug).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_favourite_conflicts() {
        let store = MemoryStore::new();
        let user = AnonymousUserId::parse("user_1_a").unwrap();
        let item = ItemId::generate();

        FavouriteStore::insert(&store, item, &user).await.unwrap();
        let err = FavouriteStore::insert(&store, item, &user)
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_filtered() {
        let store = MemoryStore::new();
        for (i, category) in ["mugs", "plates", "mugs"].into_iter().enumerate() {
            let slug = Slug::from_stored(format!("item-{i}"));
            ItemStore::insert(&store, &new_item(&format!("item {i}"), category), &slug)
                .await
                .unwrap();
        }

        let all = store.list(&CategoryFilter::All).await.unwrap();
        let names: Vec<&str> = all.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["item 2", "item 1", "item 0"]);

        let mugs = store
            .list(&CategoryFilter::Only("mugs".to_owned()))
            .await
            .unwrap();
        assert_eq!(mugs.len(), 2);
        assert!(mugs.iter().all(|i| i.category == "mugs"));

        assert_eq!(store.categories().await.unwrap(), vec!["mugs", "plates"]);
    }

    #[tokio::test]
    async fn test_delete_reports_absence() {
        let store = MemoryStore::new();
        let item = ItemStore::insert(&store, &new_item("Mug", "mugs"), &Slug::from_stored("m"))
            .await
            .unwrap();

        assert!(ItemStore::delete(&store, item.id).await.unwrap());
        assert!(!ItemStore::delete(&store, item.id).await.unwrap());
        assert!(store.get_by_id(item.id).await.unwrap().is_none());
    }
}
