//! Canonical product URLs
//!
//! Discovery yields raw anchor hrefs that often carry tracking parameters
//! (`?spid=...&src=...`). Query and fragment are stripped so the same product
//! is only fetched once and the fetch target is stable across runs.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Raw URL could not be parsed as an absolute URL
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Malformed URL '{url}': {reason}")]
pub struct UrlError {
    pub url: String,
    pub reason: String,
}

/// Absolute URL with query string and fragment removed
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CanonicalUrl(Url);

impl CanonicalUrl {
    /// Canonicalize a raw URL: keep scheme, host and path; drop query and fragment.
    pub fn parse(raw: &str) -> Result<Self, UrlError> {
        let mut url = Url::parse(raw.trim()).map_err(|e| UrlError {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;
        url.set_query(None);
        url.set_fragment(None);
        Ok(Self(url))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    /// Last non-empty path segment, used as a short label in logs
    pub fn slug(&self) -> &str {
        self.0
            .path_segments()
            .and_then(|segments| segments.rev().find(|s| !s.is_empty()))
            .unwrap_or_else(|| self.0.host_str().unwrap_or_default())
    }
}

/// Free-function form of [`CanonicalUrl::parse`]
pub fn normalize(raw: &str) -> Result<CanonicalUrl, UrlError> {
    CanonicalUrl::parse(raw)
}

/// Normalize and deduplicate raw URLs, keeping first-occurrence order.
///
/// Malformed entries are logged and dropped; they never fail the run.
pub fn dedup_urls<I, S>(raw_urls: I) -> Vec<CanonicalUrl>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut unique = Vec::new();

    for raw in raw_urls {
        match CanonicalUrl::parse(raw.as_ref()) {
            Ok(canonical) => {
                if seen.insert(canonical.clone()) {
                    unique.push(canonical);
                } else {
                    debug!("Duplicate product URL skipped: {}", raw.as_ref());
                }
            }
            Err(e) => warn!("{}", e),
        }
    }

    unique
}

impl TryFrom<String> for CanonicalUrl {
    type Error = UrlError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CanonicalUrl> for String {
    fn from(url: CanonicalUrl) -> Self {
        url.0.into()
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
