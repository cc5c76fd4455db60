//! Catalog management: item CRUD, slug assignment and media cleanup.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, instrument, warn};
use vitrine_core::{CategoryFilter, Item, ItemId, ItemPatch, NewItemInput, Slug};

use super::ServiceError;
use crate::db::{ItemStore, RepositoryError};
use crate::media::MediaGateway;

/// Upper bound on slug attempts for one item.
///
/// With a 24-bit suffix a second attempt is already vanishingly rare; the cap
/// only turns a broken generator or store into an error instead of a hang.
pub const MAX_SLUG_ATTEMPTS: usize = 64;

type SlugGenerator = Arc<dyn Fn(&str) -> Slug + Send + Sync>;

/// Item operations.
#[derive(Clone)]
pub struct CatalogService {
    items: Arc<dyn ItemStore>,
    media: Arc<dyn MediaGateway>,
    generate_slug: SlugGenerator,
}

impl CatalogService {
    /// Create a catalog service using random slugs.
    #[must_use]
    pub fn new(items: Arc<dyn ItemStore>, media: Arc<dyn MediaGateway>) -> Self {
        Self {
            items,
            media,
            generate_slug: Arc::new(Slug::generate),
        }
    }

    /// Replace the slug generator.
    #[must_use]
    pub fn with_slug_generator(
        mut self,
        generate: impl Fn(&str) -> Slug + Send + Sync + 'static,
    ) -> Self {
        self.generate_slug = Arc::new(generate);
        self
    }

    /// Validate and persist a new item under a freshly generated slug.
    ///
    /// A candidate slug is checked against the store first; if the insert
    /// still hits the unique index (a concurrent create took it) the loop
    /// draws a new one.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for bad input and
    /// `ServiceError::SlugExhausted` if no free slug was found.
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: NewItemInput) -> Result<Item, ServiceError> {
        let item = input.validate()?;

        for attempt in 1..=MAX_SLUG_ATTEMPTS {
            let slug = (self.generate_slug)(&item.name);

            if self.items.slug_exists(&slug).await? {
                debug!(%slug, attempt, "Slug already taken");
                continue;
            }

            match self.items.insert(&item, &slug).await {
                Ok(created) => {
                    info!(id = %created.id, slug = %created.slug, "Created item");
                    return Ok(created);
                }
                Err(RepositoryError::Conflict(_)) => {
                    debug!(%slug, attempt, "Slug taken concurrently");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ServiceError::SlugExhausted {
            base: vitrine_core::slug::base(&item.name),
            attempts: MAX_SLUG_ATTEMPTS,
        })
    }

    /// Get an item by id.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::ItemNotFound` if it does not exist.
    pub async fn get(&self, id: ItemId) -> Result<Item, ServiceError> {
        self.items
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::ItemNotFound)
    }

    /// Get an item by slug.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::ItemNotFound` if no item has this slug.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Item, ServiceError> {
        self.items
            .get_by_slug(slug)
            .await?
            .ok_or(ServiceError::ItemNotFound)
    }

    /// List items newest first.
    ///
    /// # Errors
    ///
    /// Returns error if the store fails.
    pub async fn list(&self, filter: &CategoryFilter) -> Result<Vec<Item>, ServiceError> {
        Ok(self.items.list(filter).await?)
    }

    /// Distinct categories in use.
    ///
    /// # Errors
    ///
    /// Returns error if the store fails.
    pub async fn categories(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self.items.categories().await?)
    }

    /// Apply a partial update. The slug never changes.
    ///
    /// Media dropped by the update stay on the media host.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for bad fields and
    /// `ServiceError::ItemNotFound` if the item does not exist.
    #[instrument(skip(self, patch), fields(id = %id))]
    pub async fn update(&self, id: ItemId, patch: ItemPatch) -> Result<Item, ServiceError> {
        let changes = patch.validate()?;
        if changes.is_empty() {
            return self.get(id).await;
        }

        let item = self
            .items
            .update(id, &changes)
            .await?
            .ok_or(ServiceError::ItemNotFound)?;
        info!("Updated item");
        Ok(item)
    }

    /// Delete an item and, best effort, its hosted media.
    ///
    /// Every media entry gets one delete call at the host. Failures are
    /// logged and do not stop the item from being removed.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::ItemNotFound` if the item does not exist.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: ItemId) -> Result<(), ServiceError> {
        let item = self.get(id).await?;

        let results = join_all(item.media.iter().map(|media| self.media.delete(media))).await;
        for (media, result) in item.media.iter().zip(results) {
            if let Err(e) = result {
                warn!(url = %media.url, error = %e, "Failed to delete hosted media");
            }
        }

        if !self.items.delete(id).await? {
            return Err(ServiceError::ItemNotFound);
        }
        info!(media = item.media.len(), "Deleted item");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use vitrine_core::{Media, NewItem, Price};

    use super::*;
    use crate::db::MemoryStore;
    use crate::media::{MediaError, MediaFile};

    /// Gateway that fails every delete and records the URLs it was asked about.
    #[derive(Default)]
    struct FailingDeletes {
        deleted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MediaGateway for FailingDeletes {
        async fn upload(&self, file: MediaFile) -> Result<Media, MediaError> {
            Err(MediaError::UnsupportedContentType(file.content_type))
        }

        async fn delete(&self, media: &Media) -> Result<(), MediaError> {
            self.deleted.lock().unwrap().push(media.url.clone());
            Err(MediaError::Api {
                status: 500,
                message: "boom".to_string(),
            })
        }
    }

    fn input(name: &str) -> NewItemInput {
        NewItemInput {
            name: Some(name.to_string()),
            description: None,
            price: Some(Decimal::new(1250, 2)),
            media: None,
            category: Some("mugs".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_retries_taken_slug() {
        let store = Arc::new(MemoryStore::new());
        let taken = NewItem {
            name: "Mug".to_string(),
            description: String::new(),
            price: Price::new(Decimal::ONE).unwrap(),
            category: "mugs".to_string(),
            media: Vec::new(),
        };
        store
            .insert(&taken, &Slug::from_stored("mug-aaaaaa"))
            .await
            .unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let service = CatalogService::new(store, Arc::new(FailingDeletes::default()))
            .with_slug_generator(move |_| {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Slug::from_stored("mug-aaaaaa")
                } else {
                    Slug::from_stored("mug-bbbbbb")
                }
            });

        let item = service.create(input("Mug")).await.unwrap();
        assert_eq!(item.slug.as_str(), "mug-bbbbbb");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_create_gives_up_after_max_attempts() {
        let store = Arc::new(MemoryStore::new());
        let service = CatalogService::new(store, Arc::new(FailingDeletes::default()))
            .with_slug_generator(|_| Slug::from_stored("same"));

        service.create(input("Mug")).await.unwrap();
        let err = service.create(input("Mug")).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::SlugExhausted {
                attempts: MAX_SLUG_ATTEMPTS,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_delete_survives_media_failures() {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(FailingDeletes::default());
        let service = CatalogService::new(store, Arc::clone(&gateway) as Arc<dyn MediaGateway>);

        let mut with_media = input("Lamp");
        with_media.media = Some(vec![
            Media::image("https://cdn.example.com/catalog-items/a.jpg"),
            Media::video("https://cdn.example.com/catalog-items/b.mp4"),
        ]);
        let item = service.create(with_media).await.unwrap();

        service.delete(item.id).await.unwrap();

        assert_eq!(gateway.deleted.lock().unwrap().len(), 2);
        assert!(matches!(
            service.get(item.id).await,
            Err(ServiceError::ItemNotFound)
        ));
        assert!(matches!(
            service.delete(item.id).await,
            Err(ServiceError::ItemNotFound)
        ));
    }

    #[tokio::test]
    async fn test_empty_patch_returns_current_item() {
        let store = Arc::new(MemoryStore::new());
        let service = CatalogService::new(store, Arc::new(FailingDeletes::default()));
        let item = service.create(input("Bowl")).await.unwrap();

        let unchanged = service
            .update(item.id, ItemPatch::default())
            .await
            .unwrap();
        assert_eq!(unchanged, item);

        let missing = service
            .update(ItemId::generate(), ItemPatch::default())
            .await;
        assert!(matches!(missing, Err(ServiceError::ItemNotFound)));
    }
}
