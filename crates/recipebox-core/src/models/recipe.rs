use serde::{Deserialize, Serialize};
use url::Url;

/// One recipe entry from the catalog.
///
/// Field names follow the domain; the wire names are snake_case and mapped
/// with `serde(rename)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(rename = "uuid")]
    pub id: String,
    pub name: String,
    pub cuisine: String,
    #[serde(rename = "photo_url_small", default)]
    pub small_photo_url: Option<String>,
    #[serde(rename = "photo_url_large", default)]
    pub large_photo_url: Option<String>,
    #[serde(rename = "source_url", default)]
    pub source_url: Option<String>,
    #[serde(rename = "youtube_url", default)]
    pub video_url: Option<String>,
}

impl Recipe {
    /// Name of the first required field that is empty, if any.
    pub fn first_empty_field(&self) -> Option<&'static str> {
        if self.id.is_empty() {
            Some("uuid")
        } else if self.name.is_empty() {
            Some("name")
        } else if self.cuisine.is_empty() {
            Some("cuisine")
        } else {
            None
        }
    }

    /// Video link, only when it is a usable absolute URL.
    pub fn video_link(&self) -> Option<Url> {
        self.video_url
            .as_deref()
            .and_then(|raw| Url::parse(raw).ok())
            .filter(|url| url.host_str().is_some())
    }
}

/// Top-level response body: `{ "recipes": [...] }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipesResponse {
    pub recipes: Vec<Recipe>,
}
