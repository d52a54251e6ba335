//! Entry point for consumers: fetch the catalog, resolve images per recipe.

use anyhow::{Context, Result};
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ReqwestTransport};
use crate::cache::{CacheEntry, CacheError, ImageCache};
use crate::catalog::{Catalog, CatalogError};
use crate::config::{Config, DEFAULT_PREFETCH_CONCURRENCY};
use crate::models::Recipe;

/// Outcome of warming the cache for a whole catalog.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PrefetchReport {
    /// Already on disk before the run
    pub cached: usize,
    /// Downloaded during the run
    pub fetched: usize,
    pub failed: usize,
}

/// Catalog fetcher plus image cache behind one handle.
/// Clone is cheap; both halves share the same transport.
#[derive(Clone)]
pub struct CatalogClient {
    api: ApiClient,
    images: ImageCache,
    prefetch_concurrency: usize,
}

impl CatalogClient {
    pub fn new(api: ApiClient, images: ImageCache) -> Self {
        Self {
            api,
            images,
            prefetch_concurrency: DEFAULT_PREFETCH_CONCURRENCY,
        }
    }

    /// Build a client over reqwest using the configured timeout and cache dir.
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = ReqwestTransport::with_timeout(config.request_timeout())
            .context("Failed to build HTTP client")?;
        let api = ApiClient::with_transport(Arc::new(transport));
        let cache_dir = config.image_cache_dir()?;
        let images = ImageCache::new(cache_dir, api.clone())
            .context("Failed to open image cache")?;
        Ok(Self::new(api, images).with_prefetch_concurrency(config.prefetch_concurrency))
    }

    pub fn with_prefetch_concurrency(mut self, concurrency: usize) -> Self {
        self.prefetch_concurrency = concurrency.max(1);
        self
    }

    pub fn images(&self) -> &ImageCache {
        &self.images
    }

    /// Fetch and validate a fresh catalog.
    pub async fn fetch_catalog(&self, url: &str) -> Result<Catalog, CatalogError> {
        self.api.fetch_catalog(url).await
    }

    /// Image bytes for one recipe: from disk if cached, otherwise download
    /// the small photo, store it, and read it back.
    pub async fn image_for(&self, recipe: &Recipe) -> Result<Bytes, CacheError> {
        if let Some(bytes) = self.images.get(&recipe.id).await {
            return Ok(bytes);
        }

        match self
            .images
            .fetch_and_store(&recipe.id, recipe.small_photo_url.as_deref())
            .await
        {
            Ok(_) => {}
            Err(CacheError::AlreadyExists(_)) => {
                debug!(id = %recipe.id, "Image cached concurrently, reading it back");
            }
            Err(e) => return Err(e),
        }

        self.images
            .get(&recipe.id)
            .await
            .ok_or_else(|| CacheError::RetrieveFailed(recipe.id.clone()))
    }

    /// Remove every cached image. Returns the number of files deleted.
    pub async fn clear_image_cache(&self) -> Result<usize, CacheError> {
        self.images.clear_all().await
    }

    pub async fn cache_status(&self) -> Result<Vec<CacheEntry>, CacheError> {
        self.images.entries().await
    }

    /// Warm the cache for every recipe, a few at a time. Per-recipe failures
    /// are logged and counted, never fatal.
    pub async fn prefetch_images(&self, catalog: &Catalog) -> PrefetchReport {
        let mut report = PrefetchReport::default();

        for chunk in catalog.recipes().chunks(self.prefetch_concurrency) {
            let futures: Vec<_> = chunk
                .iter()
                .map(|recipe| async move {
                    if self.images.contains(&recipe.id).await {
                        return (recipe, Ok(false));
                    }
                    let result = self
                        .images
                        .ensure(&recipe.id, recipe.small_photo_url.as_deref())
                        .await
                        .map(|()| true);
                    (recipe, result)
                })
                .collect();

            for (recipe, result) in futures::future::join_all(futures).await {
                match result {
                    Ok(true) => report.fetched += 1,
                    Ok(false) => report.cached += 1,
                    Err(e) => {
                        warn!(id = %recipe.id, name = %recipe.name, error = %e, "Image load error");
                        report.failed += 1;
                    }
                }
            }
        }

        info!(
            cached = report.cached,
            fetched = report.fetched,
            failed = report.failed,
            "Image prefetch complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use crate::api::scripted::{Reply, ScriptedTransport};
    use crate::api::ApiError;

    const CATALOG_URL: &str = "https://api.example.com/recipes.json";
    const PHOTO_A: &str = "https://cdn.example.com/a/small.jpg";
    const PHOTO_B: &str = "https://cdn.example.com/b/small.jpg";

    const CATALOG: &str = r#"{"recipes": [
        {"cuisine": "Malaysian", "name": "Apam Balik", "uuid": "a",
         "photo_url_small": "https://cdn.example.com/a/small.jpg"},
        {"cuisine": "British", "name": "Bakewell Tart", "uuid": "b",
         "photo_url_small": "https://cdn.example.com/b/small.jpg"},
        {"cuisine": "British", "name": "Battenberg Cake", "uuid": "c"}
    ]}"#;

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(3, 3, image::Rgb([10, 120, 40]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png)
            .expect("encode test png");
        buf.into_inner()
    }

    fn setup(transport: ScriptedTransport) -> (tempfile::TempDir, CatalogClient, Arc<ScriptedTransport>) {
        let dir = tempfile::tempdir().expect("tempdir");
        let transport = Arc::new(transport);
        let api = ApiClient::with_transport(transport.clone());
        let images = ImageCache::new(dir.path().to_path_buf(), api.clone()).expect("cache");
        (dir, CatalogClient::new(api, images).with_prefetch_concurrency(2), transport)
    }

    fn scripted() -> ScriptedTransport {
        ScriptedTransport::new()
            .ok(CATALOG_URL, CATALOG)
            .ok(PHOTO_A, png_bytes())
            .reply(PHOTO_B, Reply::Status(500, Bytes::new()))
    }

    #[tokio::test]
    async fn test_image_for_fills_then_serves_from_disk() {
        let (_dir, client, transport) = setup(scripted());
        let catalog = client.fetch_catalog(CATALOG_URL).await.expect("catalog");
        let apam = catalog.find("a").expect("recipe a");

        let first = client.image_for(apam).await.expect("image");
        assert_eq!(first.to_vec(), png_bytes());
        let calls_after_fill = transport.calls();

        let second = client.image_for(apam).await.expect("image");
        assert_eq!(first, second);
        assert_eq!(transport.calls(), calls_after_fill);
    }

    #[tokio::test]
    async fn test_image_for_surfaces_row_errors() {
        let (_dir, client, _) = setup(scripted());
        let catalog = client.fetch_catalog(CATALOG_URL).await.expect("catalog");

        let err = client.image_for(catalog.find("b").expect("b")).await.unwrap_err();
        assert!(matches!(err, CacheError::Api(ApiError::Http(500))));

        let err = client.image_for(catalog.find("c").expect("c")).await.unwrap_err();
        assert!(matches!(err, CacheError::InvalidUrl(None)));
    }

    #[tokio::test]
    async fn test_image_for_unreadable_existing_file() {
        let (_dir, client, transport) = setup(scripted());
        let catalog = client.fetch_catalog(CATALOG_URL).await.expect("catalog");
        std::fs::write(client.images().image_path("a"), b"half a jpeg").expect("write");

        let err = client.image_for(catalog.find("a").expect("a")).await.unwrap_err();
        assert!(matches!(err, CacheError::RetrieveFailed(ref id) if id == "a"));
        // catalog fetch only; the existing file blocked the download
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_image_for_same_recipe() {
        let (_dir, client, _) = setup(scripted());
        let catalog = client.fetch_catalog(CATALOG_URL).await.expect("catalog");
        let apam = catalog.find("a").expect("a");

        let (x, y) = tokio::join!(client.image_for(apam), client.image_for(apam));
        assert_eq!(x.expect("first"), y.expect("second"));
    }

    #[tokio::test]
    async fn test_prefetch_report() {
        let (_dir, client, _) = setup(scripted());
        let catalog = client.fetch_catalog(CATALOG_URL).await.expect("catalog");

        let report = client.prefetch_images(&catalog).await;
        assert_eq!(report, PrefetchReport { cached: 0, fetched: 1, failed: 2 });

        let report = client.prefetch_images(&catalog).await;
        assert_eq!(report, PrefetchReport { cached: 1, fetched: 0, failed: 2 });
    }

    #[tokio::test]
    async fn test_clear_and_status() {
        let (_dir, client, _) = setup(scripted());
        let catalog = client.fetch_catalog(CATALOG_URL).await.expect("catalog");
        client.prefetch_images(&catalog).await;

        let status = client.cache_status().await.expect("status");
        assert_eq!(status.len(), 1);
        assert_eq!(status[0].id, "a");

        assert_eq!(client.clear_image_cache().await.expect("clear"), 1);
        assert!(client.cache_status().await.expect("status").is_empty());
    }

    #[tokio::test]
    async fn test_catalog_errors_unchanged() {
        let (_dir, client, _) = setup(ScriptedTransport::new().reply(CATALOG_URL, Reply::NotConnected));
        assert!(matches!(
            client.fetch_catalog(CATALOG_URL).await,
            Err(CatalogError::Api(ApiError::NotConnected))
        ));
    }
}
