//! Local image cache.
//!
//! This module provides the `ImageCache` for storing recipe photos on disk,
//! one file per recipe id. Images are fetched on a miss and kept until the
//! cache is explicitly cleared; there is no expiry or size bound.

pub mod error;
pub mod images;

pub use error::CacheError;
pub use images::{CacheEntry, ImageCache};
