//! Crawling service traits
//!
//! The batch engine and the orchestrator only see these seams, so the HTTP
//! client, the listing crawler and test doubles are interchangeable.

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use crate::domain::canonical_url::CanonicalUrl;

/// Failure to retrieve one product page, after the fetcher's retries are spent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Request to {url} timed out after {attempts} attempt(s)")]
    Timeout { url: String, attempts: u32 },

    #[error("HTTP {status} from {url} after {attempts} attempt(s)")]
    HttpStatus { url: String, status: u16, attempts: u32 },

    #[error("Connection to {url} failed after {attempts} attempt(s): {cause}")]
    Connection { url: String, cause: String, attempts: u32 },

    #[error("Failed to read response body from {url}: {cause}")]
    Body { url: String, cause: String },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url, .. }
            | Self::HttpStatus { url, .. }
            | Self::Connection { url, .. }
            | Self::Body { url, .. } => url,
        }
    }

    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Retrieves product detail documents
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the document at `url` and return its text
    async fn fetch_page(&self, url: &CanonicalUrl) -> Result<String, FetchError>;
}

/// Produces raw candidate product URLs from a listing source
#[async_trait]
pub trait UrlDiscovery: Send + Sync {
    /// Collect raw product URLs. Partial results are returned when the source
    /// stops responding; an error means nothing could be collected at all.
    async fn discover(&self) -> Result<Vec<String>>;

    /// Short label for logs
    fn source_name(&self) -> &str;
}
