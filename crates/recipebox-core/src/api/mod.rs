//! HTTP access for the recipe catalog and image payloads.
//!
//! This module provides the `Transport` seam (one GET, no retries), its
//! reqwest implementation, and the `ApiClient` that validates URLs and
//! status codes before handing bodies to the decoder.

pub mod client;
pub mod error;
pub mod transport;

#[cfg(test)]
pub(crate) mod scripted;

pub use client::ApiClient;
pub use error::{ApiError, BoxError};
pub use transport::{parse_url, HttpResponse, ReqwestTransport, Transport};
