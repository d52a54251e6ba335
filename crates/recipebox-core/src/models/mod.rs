//! Data models for catalog entities.
//!
//! - `Recipe`: one catalog entry with its optional photo/source/video links
//! - `RecipesResponse`: the wire envelope around the recipe array

pub mod recipe;

pub use recipe::{Recipe, RecipesResponse};
