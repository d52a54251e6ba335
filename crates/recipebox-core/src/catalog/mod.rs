//! Recipe catalog: decoding, validation and list shaping.
//!
//! A `Catalog` only exists after every record passed validation, so
//! consumers never see a partially-valid list.

pub mod decode;
pub mod view;

use thiserror::Error;

use crate::api::ApiError;
use crate::models::Recipe;

pub use decode::{decode, DecodeError};
pub use view::{CuisineSections, SortOrder};

/// Ordered recipes from one successful fetch.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    recipes: Vec<Recipe>,
}

impl Catalog {
    pub(crate) fn from_validated(recipes: Vec<Recipe>) -> Self {
        Self { recipes }
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Recipe> {
        self.recipes.iter()
    }

    pub fn find(&self, id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }

    pub fn into_recipes(self) -> Vec<Recipe> {
        self.recipes
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Recipe;
    type IntoIter = std::slice::Iter<'a, Recipe>;

    fn into_iter(self) -> Self::IntoIter {
        self.recipes.iter()
    }
}

/// Failure of a catalog fetch: either the transport or the decoder,
/// passed through unchanged.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_by_id() {
        let catalog = decode(
            br#"{"recipes": [
                {"cuisine": "Tunisian", "name": "Brik", "uuid": "b1"},
                {"cuisine": "Polish", "name": "Pierogi", "uuid": "p1"}
            ]}"#,
        )
        .expect("valid catalog");

        assert_eq!(catalog.find("p1").map(|r| r.name.as_str()), Some("Pierogi"));
        assert!(catalog.find("zz").is_none());
        assert_eq!((&catalog).into_iter().count(), 2);
        assert!(!catalog.is_empty());
        assert_eq!(catalog.into_recipes().len(), 2);
    }

    #[test]
    fn test_catalog_error_is_transparent() {
        let err: CatalogError = ApiError::Http(500).into();
        assert_eq!(
            err.to_string(),
            "Server error with status code: 500. Please try again later."
        );

        let err: CatalogError = DecodeError::EmptyData.into();
        assert_eq!(err.to_string(), "No recipes found. The list is currently empty.");
    }
}
