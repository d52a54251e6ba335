//! HTTP transport seam.
//!
//! `Transport` performs exactly one GET and reports the status and body.
//! It does not interpret the status; the client layer decides what a
//! non-200 response means. Failures below HTTP are classified into
//! `ApiError::Timeout`, `ApiError::NotConnected`, or an opaque transport error.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::ApiError;

/// HTTP request timeout in seconds.
/// 30s allows for slow CDN responses while failing fast enough for good UX.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Connect timeout in seconds, kept shorter so an offline machine fails quickly.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Status and body of a completed GET.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            body: Bytes::new(),
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a single GET. No retries.
    async fn get(&self, url: &Url) -> Result<HttpResponse, ApiError>;
}

/// Parse a URL string, requiring both a scheme and a host.
pub fn parse_url(raw: &str) -> Result<Url, ApiError> {
    match Url::parse(raw) {
        Ok(url) if !url.scheme().is_empty() && url.host_str().is_some_and(|h| !h.is_empty()) => {
            Ok(url)
        }
        _ => Err(ApiError::InvalidUrl(raw.to_string())),
    }
}

/// Transport backed by reqwest.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, ApiError> {
        Self::with_timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS).min(timeout))
            .build()
            .map_err(|e| ApiError::Transport(Box::new(e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<HttpResponse, ApiError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;

        let status = response.status().as_u16();
        debug!(url = %url, status, "GET completed");

        // Error bodies are never interpreted, so don't bother downloading them
        if status != 200 {
            return Ok(HttpResponse::with_status(status));
        }

        let body = response.bytes().await.map_err(ApiError::from_reqwest)?;
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url() {
        assert!(parse_url("https://d3jbb8n5wk0qxi.cloudfront.net/recipes.json").is_ok());
        assert!(parse_url("http://localhost:8080/x").is_ok());

        assert!(matches!(parse_url("not a url"), Err(ApiError::InvalidUrl(_))));
        assert!(matches!(parse_url("invalid-url"), Err(ApiError::InvalidUrl(_))));
        assert!(matches!(parse_url(""), Err(ApiError::InvalidUrl(_))));
        assert!(matches!(parse_url("/recipes.json"), Err(ApiError::InvalidUrl(_))));
        // scheme but no host
        assert!(matches!(parse_url("mailto:chef@example.com"), Err(ApiError::InvalidUrl(_))));
    }

    #[test]
    fn test_invalid_url_keeps_input() {
        match parse_url("invalid-url") {
            Err(ApiError::InvalidUrl(raw)) => assert_eq!(raw, "invalid-url"),
            other => panic!("expected InvalidUrl, got {:?}", other),
        }
    }

    #[test]
    fn test_reqwest_transport_builds() {
        assert!(ReqwestTransport::new().is_ok());
        assert!(ReqwestTransport::with_timeout(Duration::from_secs(1)).is_ok());
    }

    #[tokio::test]
    async fn test_refused_connection_is_not_connected() {
        // Bind to grab a free port, then close it so nothing is listening
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);

        let transport = ReqwestTransport::with_timeout(Duration::from_secs(5)).expect("transport");
        let url = parse_url(&format!("http://127.0.0.1:{}/", port)).expect("url");

        assert!(matches!(transport.get(&url).await, Err(ApiError::NotConnected)));
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();

        // Accept connections and hold them open without ever answering
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let transport =
            ReqwestTransport::with_timeout(Duration::from_millis(500)).expect("transport");
        let url = parse_url(&format!("http://127.0.0.1:{}/recipes.json", port)).expect("url");

        assert!(matches!(transport.get(&url).await, Err(ApiError::Timeout)));
        server.abort();
    }
}
