//! `PostgreSQL` implementation of the item and favourite stores.
//!
//! Queries are built at runtime with `query_as` so the crate compiles without
//! a live database. Uniqueness is enforced by the indexes created in
//! `migrations/`; unique violations are mapped to `RepositoryError::Conflict`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::{debug, instrument};
use uuid::Uuid;
use vitrine_core::{
    AnonymousUserId, CategoryFilter, Favourite, Item, ItemChanges, ItemId, Media, NewItem, Price,
    Slug,
};

use super::{FavouriteStore, ItemStore, RepositoryError};

const ITEM_COLUMNS: &str =
    "id, slug, name, description, price, category, media, created_at, updated_at";

/// Store backed by the `catalog` schema.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: ItemId,
    slug: Slug,
    name: String,
    description: String,
    price: Price,
    category: String,
    media: Json<Vec<Media>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Self {
            id: row.id,
            slug: row.slug,
            name: row.name,
            description: row.description,
            price: row.price,
            category: row.category,
            media: row.media.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct FavouriteRow {
    item_id: ItemId,
    anonymous_user_id: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<FavouriteRow> for Favourite {
    type Error = RepositoryError;

    fn try_from(row: FavouriteRow) -> Result<Self, Self::Error> {
        let anonymous_user_id = AnonymousUserId::parse(&row.anonymous_user_id).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid anonymous user id in database: {e}"))
        })?;

        Ok(Self {
            item_id: row.item_id,
            anonymous_user_id,
            created_at: row.created_at,
        })
    }
}

/// Map a unique-index violation to `Conflict`, anything else to `Database`.
fn conflict_or_database(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}

#[async_trait]
impl ItemStore for PgStore {
    #[instrument(skip(self, item, slug), fields(slug = %slug))]
    async fn insert(&self, item: &NewItem, slug: &Slug) -> Result<Item, RepositoryError> {
        let row: ItemRow = sqlx::query_as(&format!(
            r"
            INSERT INTO catalog.item (id, slug, name, description, price, category, media)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ITEM_COLUMNS}
            "
        ))
        .bind(ItemId::generate())
        .bind(slug)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price)
        .bind(&item.category)
        .bind(Json(&item.media))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or_database(e, "slug"))?;

        debug!(id = %row.id, "Inserted item");
        Ok(row.into())
    }

    async fn slug_exists(&self, slug: &Slug) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM catalog.item WHERE slug = $1)")
                .bind(slug)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn get_by_id(&self, id: ItemId) -> Result<Option<Item>, RepositoryError> {
        let row: Option<ItemRow> = sqlx::query_as(&format!(
            "SELECT {ITEM_COLUMNS} FROM catalog.item WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Item>, RepositoryError> {
        let row: Option<ItemRow> = sqlx::query_as(&format!(
            "SELECT {ITEM_COLUMNS} FROM catalog.item WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn get_many(&self, ids: &[ItemId]) -> Result<Vec<Item>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = ids.iter().map(ItemId::as_uuid).collect();

        let rows: Vec<ItemRow> = sqlx::query_as(&format!(
            r"
            SELECT {ITEM_COLUMNS}
            FROM catalog.item
            WHERE id = ANY($1)
            ORDER BY created_at, id
            "
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: &CategoryFilter) -> Result<Vec<Item>, RepositoryError> {
        let rows: Vec<ItemRow> = sqlx::query_as(&format!(
            r"
            SELECT {ITEM_COLUMNS}
            FROM catalog.item
            WHERE $1::text IS NULL OR category = $1
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(filter.category())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn categories(&self) -> Result<Vec<String>, RepositoryError> {
        let categories: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT category FROM catalog.item ORDER BY category")
                .fetch_all(&self.pool)
                .await?;
        Ok(categories)
    }

    #[instrument(skip(self, changes))]
    async fn update(
        &self,
        id: ItemId,
        changes: &ItemChanges,
    ) -> Result<Option<Item>, RepositoryError> {
        let row: Option<ItemRow> = sqlx::query_as(&format!(
            r"
            UPDATE catalog.item
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                media = COALESCE($5, media),
                category = COALESCE($6, category),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ITEM_COLUMNS}
            "
        ))
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.price)
        .bind(changes.media.as_ref().map(Json))
        .bind(changes.category.as_deref())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ItemId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM catalog.item WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl FavouriteStore for PgStore {
    async fn find(
        &self,
        item_id: ItemId,
        user: &AnonymousUserId,
    ) -> Result<Option<Favourite>, RepositoryError> {
        let row: Option<FavouriteRow> = sqlx::query_as(
            r"
            SELECT item_id, anonymous_user_id, created_at
            FROM catalog.favourite
            WHERE item_id = $1 AND anonymous_user_id = $2
            ",
        )
        .bind(item_id)
        .bind(user.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Favourite::try_from).transpose()
    }

    #[instrument(skip(self, user), fields(user = %user))]
    async fn insert(
        &self,
        item_id: ItemId,
        user: &AnonymousUserId,
    ) -> Result<Favourite, RepositoryError> {
        let row: FavouriteRow = sqlx::query_as(
            r"
            INSERT INTO catalog.favourite (item_id, anonymous_user_id)
            VALUES ($1, $2)
            RETURNING item_id, anonymous_user_id, created_at
            ",
        )
        .bind(item_id)
        .bind(user.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or_database(e, "favourite"))?;
        row.try_into()
    }

    #[instrument(skip(self, user), fields(user = %user))]
    async fn delete(
        &self,
        item_id: ItemId,
        user: &AnonymousUserId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM catalog.favourite WHERE item_id = $1 AND anonymous_user_id = $2",
        )
        .bind(item_id)
        .bind(user.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_for_user(
        &self,
        user: &AnonymousUserId,
    ) -> Result<Vec<Favourite>, RepositoryError> {
        let rows: Vec<FavouriteRow> = sqlx::query_as(
            r"
            SELECT item_id, anonymous_user_id, created_at
            FROM catalog.favourite
            WHERE anonymous_user_id = $1
            ORDER BY created_at, item_id
            ",
        )
        .bind(user.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Favourite::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<Favourite>, RepositoryError> {
        let rows: Vec<FavouriteRow> = sqlx::query_as(
            r"
            SELECT item_id, anonymous_user_id, created_at
            FROM catalog.favourite
            ORDER BY created_at, anonymous_user_id, item_id
            ",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Favourite::try_from).collect()
    }
}
