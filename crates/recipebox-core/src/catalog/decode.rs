//! Response body decoding and validation.
//!
//! Acceptance is all-or-nothing: one record with an empty required field
//! rejects the whole catalog.

use thiserror::Error;

use super::Catalog;
use crate::models::RecipesResponse;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Malformed recipe detected. The data couldn't be decoded: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Malformed recipe detected. Record {index} is missing a required `{field}`.")]
    InvalidRecord { index: usize, field: &'static str },

    #[error("No recipes found. The list is currently empty.")]
    EmptyData,
}

impl DecodeError {
    /// Both shape mismatches and invalid records count as decoding errors;
    /// an empty list is reported separately.
    pub fn is_decoding_error(&self) -> bool {
        !matches!(self, DecodeError::EmptyData)
    }
}

/// Decode a catalog body. Pure; no I/O.
pub fn decode(body: &[u8]) -> Result<Catalog, DecodeError> {
    let response: RecipesResponse = serde_json::from_slice(body)?;

    if response.recipes.is_empty() {
        return Err(DecodeError::EmptyData);
    }

    for (index, recipe) in response.recipes.iter().enumerate() {
        if let Some(field) = recipe.first_empty_field() {
            return Err(DecodeError::InvalidRecord { index, field });
        }
    }

    Ok(Catalog::from_validated(response.recipes))
}
