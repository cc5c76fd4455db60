//! Vitrine Core - Domain types for the catalog.
//!
//! This crate provides the types shared by every Vitrine component:
//! - `server` - HTTP API, persistence and media gateway
//! - `cli` - Migrations and the device client
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Slug derivation, item validation and the insights
//! aggregation live here so they can be exercised without a running store.
//!
//! # Modules
//!
//! - [`types`] - Identifiers, prices, media, items, favourites and insights

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
