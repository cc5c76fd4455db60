//! Catalog items and their create/update payloads.
//!
//! Request bodies arrive as [`NewItemInput`] and [`ItemPatch`] with every
//! field optional so that a missing field is reported as a
//! [`ValidationError`] rather than a deserialization failure. Validation turns
//! them into [`NewItem`] and [`ItemChanges`], which the stores accept.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::category::ALL_CATEGORIES;
use super::id::ItemId;
use super::media::Media;
use super::price::{Price, PriceError};
use super::slug::Slug;

/// Errors raised while validating item payloads.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is absent or blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    /// The price is below zero.
    #[error(transparent)]
    Price(#[from] PriceError),
    /// The category is the reserved wildcard.
    #[error("category \"{ALL_CATEGORIES}\" is reserved")]
    ReservedCategory,
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub slug: Slug,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    pub media: Vec<Media>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// First image, used as the share preview.
    #[must_use]
    pub fn cover_image(&self) -> Option<&Media> {
        self.media
            .iter()
            .find(|m| m.kind == super::media::MediaKind::Image)
    }
}

/// Raw create payload as sent by the admin client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItemInput {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub media: Option<Vec<Media>>,
    pub category: Option<String>,
}

/// A validated item ready to be persisted. The slug is assigned at insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    pub media: Vec<Media>,
}

impl NewItemInput {
    /// Check required fields and normalise the payload.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if `name`, `price` or `category` is missing,
    /// the price is negative, or the category is the reserved `"all"`.
    pub fn validate(self) -> Result<NewItem, ValidationError> {
        let name = required_text(self.name, "name")?;
        let price = Price::new(self.price.ok_or(ValidationError::MissingField("price"))?)?;
        let category = category(self.category)?;

        Ok(NewItem {
            name,
            description: self.description.unwrap_or_default(),
            price,
            category,
            media: self.media.unwrap_or_default(),
        })
    }
}

/// Raw partial update payload. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub media: Option<Vec<Media>>,
    pub category: Option<String>,
}

/// A validated partial update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub media: Option<Vec<Media>>,
    pub category: Option<String>,
}

impl ItemPatch {
    /// Validate the supplied fields with the same rules as creation.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if a supplied field is blank or invalid.
    pub fn validate(self) -> Result<ItemChanges, ValidationError> {
        Ok(ItemChanges {
            name: self
                .name
                .map(|name| required_text(Some(name), "name"))
                .transpose()?,
            description: self.description,
            price: self.price.map(Price::new).transpose()?,
            media: self.media,
            category: self
                .category
                .map(|value| category(Some(value)))
                .transpose()?,
        })
    }
}

impl ItemChanges {
    /// Whether the update touches no field.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.media.is_none()
            && self.category.is_none()
    }

    /// Apply the changes to `item`. The slug and identifier never change.
    pub fn apply(&self, item: &mut Item, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            item.name.clone_from(name);
        }
        if let Some(description) = &self.description {
            item.description.clone_from(description);
        }
        if let Some(price) = self.price {
            item.price = price;
        }
        if let Some(media) = &self.media {
            item.media.clone_from(media);
        }
        if let Some(category) = &self.category {
            item.category.clone_from(category);
        }
        item.updated_at = now;
    }
}

fn required_text(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_owned()),
        _ => Err(ValidationError::MissingField(field)),
    }
}

fn category(value: Option<String>) -> Result<String, ValidationError> {
    let category = required_text(value, "category")?;
    if category.eq_ignore_ascii_case(ALL_CATEGORIES) {
        return Err(ValidationError::ReservedCategory);
    }
    Ok(category)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input() -> NewItemInput {
        NewItemInput {
            name: Some("Blue Mug".to_owned()),
            description: None,
            price: Some(Decimal::new(1250, 2)),
            media: None,
            category: Some("mugs".to_owned()),
        }
    }

    fn item() -> Item {
        let now = Utc::now();
        Item {
            id: ItemId::generate(),
            slug: Slug::from_stored("blue-mug-abc123"),
            name: "Blue Mug".to_owned(),
            description: String::new(),
            price: Price::new(Decimal::new(1250, 2)).unwrap(),
            category: "mugs".to_owned(),
            media: vec![Media::video("v.mp4"), Media::image("a.jpg")],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_validate_defaults_optional_fields() {
        let item = input().validate().unwrap();
        assert_eq!(item.name, "Blue Mug");
        assert_eq!(item.description, "");
        assert!(item.media.is_empty());
    }

    #[test]
    fn test_validate_missing_fields() {
        let mut missing_name = input();
        missing_name.name = Some("   ".to_owned());
        assert_eq!(
            missing_name.validate(),
            Err(ValidationError::MissingField("name"))
        );

        let mut missing_price = input();
        missing_price.price = None;
        assert_eq!(
            missing_price.validate(),
            Err(ValidationError::MissingField("price"))
        );

        let mut missing_category = input();
        missing_category.category = None;
        assert_eq!(
            missing_category.validate(),
            Err(ValidationError::MissingField("category"))
        );
    }

    #[test]
    fn test_validate_zero_price_is_allowed() {
        let mut free = input();
        free.price = Some(Decimal::ZERO);
        assert!(free.validate().is_ok());
    }

    #[test]
    fn test_validate_negative_price() {
        let mut negative = input();
        negative.price = Some(Decimal::new(-1, 0));
        assert!(matches!(
            negative.validate(),
            Err(ValidationError::Price(PriceError::Negative(_)))
        ));
    }

    #[test]
    fn test_validate_price_out_of_column_range() {
        let mut precise = input();
        precise.price = Some(Decimal::new(19_999, 3));
        assert!(matches!(
            precise.validate(),
            Err(ValidationError::Price(PriceError::TooPrecise(_)))
        ));

        let mut large = input();
        large.price = Some(Decimal::new(12_345_678_901, 0));
        assert!(matches!(
            large.validate(),
            Err(ValidationError::Price(PriceError::TooLarge(_)))
        ));
    }

    #[test]
    fn test_validate_reserved_category() {
        let mut reserved = input();
        reserved.category = Some("All".to_owned());
        assert_eq!(reserved.validate(), Err(ValidationError::ReservedCategory));
    }

    #[test]
    fn test_input_accepts_json_number_price() {
        let raw: NewItemInput =
            serde_json::from_str(r#"{"name":"Mug","price":12,"category":"mugs"}"#).unwrap();
        assert_eq!(raw.price, Some(Decimal::new(12, 0)));
    }

    #[test]
    fn test_patch_applies_only_supplied_fields() {
        let mut item = item();
        let slug = item.slug.clone();
        let changes = ItemPatch {
            price: Some(Decimal::new(999, 2)),
            ..ItemPatch::default()
        }
        .validate()
        .unwrap();

        let later = item.updated_at + chrono::Duration::seconds(5);
        changes.apply(&mut item, later);

        assert_eq!(item.price.amount(), Decimal::new(999, 2));
        assert_eq!(item.name, "Blue Mug");
        assert_eq!(item.slug, slug);
        assert_eq!(item.updated_at, later);
    }

    #[test]
    fn test_patch_rejects_blank_name() {
        let patch = ItemPatch {
            name: Some(String::new()),
            ..ItemPatch::default()
        };
        assert_eq!(patch.validate(), Err(ValidationError::MissingField("name")));
    }

    #[test]
    fn test_empty_patch() {
        assert!(ItemPatch::default().validate().unwrap().is_empty());
    }

    #[test]
    fn test_cover_image_skips_videos() {
        assert_eq!(item().cover_image().map(|m| m.url.as_str()), Some("a.jpg"));
    }
}
