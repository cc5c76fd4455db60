//! Core types for Vitrine.
//!
//! This module provides type-safe wrappers for the catalog's domain concepts.

pub mod category;
pub mod favourite;
pub mod id;
pub mod insights;
pub mod item;
pub mod media;
pub mod price;
pub mod slug;
pub mod user;

pub use category::{ALL_CATEGORIES, CategoryFilter};
pub use favourite::{Favourite, ResolvedFavourite, ToggleOutcome};
pub use id::ItemId;
pub use insights::{FavouriteTally, FavouritedItem, Insights};
pub use item::{Item, ItemChanges, ItemPatch, NewItem, NewItemInput, ValidationError};
pub use media::{Media, MediaKind};
pub use price::{Price, PriceError};
pub use slug::Slug;
pub use user::{AnonymousUserId, AnonymousUserIdError};
