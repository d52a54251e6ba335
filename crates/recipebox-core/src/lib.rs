//! Recipe catalog client with an on-disk image cache.
//!
//! The pipeline fetches a remote JSON catalog, validates it all-or-nothing,
//! and resolves each recipe's photo through a content-addressed cache that
//! downloads at most once per recipe id.
//!
//! Consumers normally only need [`CatalogClient`]:
//!
//! - [`CatalogClient::fetch_catalog`] for a fresh, validated [`Catalog`]
//! - [`CatalogClient::image_for`] for one recipe's image bytes
//! - [`CatalogClient::clear_image_cache`] to drop all cached images

pub mod api;
pub mod cache;
pub mod catalog;
pub mod client;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError, HttpResponse, ReqwestTransport, Transport};
pub use cache::{CacheEntry, CacheError, ImageCache};
pub use catalog::{Catalog, CatalogError, DecodeError, SortOrder};
pub use client::{CatalogClient, PrefetchReport};
pub use config::Config;
pub use models::Recipe;
