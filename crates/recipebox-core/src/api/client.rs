//! API client for fetching the recipe catalog and raw image payloads.
//!
//! This module provides the `ApiClient` struct, which layers URL
//! validation and status checking on top of a `Transport`.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info};
use url::Url;

use super::transport::{parse_url, ReqwestTransport, Transport};
use super::ApiError;
use crate::catalog::{self, Catalog, CatalogError};

/// Status code every successful fetch must carry.
const EXPECTED_STATUS: u16 = 200;

/// Catalog fetcher.
/// Clone is cheap - the transport is shared behind an Arc.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    /// Create a client over the default reqwest transport
    pub fn new() -> Result<Self, ApiError> {
        Ok(Self::with_transport(Arc::new(ReqwestTransport::new()?)))
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// GET `url` and return the body, failing unless the status is 200.
    /// The URL is validated before any network call is made.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Bytes, ApiError> {
        let url = parse_url(url)?;
        self.fetch_url(&url).await
    }

    pub async fn fetch_url(&self, url: &Url) -> Result<Bytes, ApiError> {
        let response = self.transport.get(url).await?;
        if response.status != EXPECTED_STATUS {
            debug!(url = %url, status = response.status, "Unexpected status");
            return Err(ApiError::from_status(response.status));
        }
        Ok(response.body)
    }

    /// Fetch and decode the full catalog. Every call goes to the network;
    /// nothing is cached here.
    pub async fn fetch_catalog(&self, url: &str) -> Result<Catalog, CatalogError> {
        let body = self.fetch_bytes(url).await?;
        let catalog = catalog::decode(&body)?;
        info!(url, recipes = catalog.len(), "Catalog loaded");
        Ok(catalog)
    }
}
