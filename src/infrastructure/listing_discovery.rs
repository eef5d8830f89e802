//! Product URL discovery
//!
//! `HttpListingDiscovery` walks a category listing page by page, the static
//! counterpart of pressing "load more" in a browser. `FileUrlDiscovery`
//! reads a prepared URL list. Both discard anything that is not `https`.

#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::services::UrlDiscovery;
use crate::infrastructure::http_client::HttpClient;

/// Anchors whose class list mentions `product-item`
pub const PRODUCT_ANCHOR_SELECTOR: &str = r#"a[class*="product-item"][href]"#;
const PAGE_PARAM: &str = "page";

pub fn is_secure_url(raw: &str) -> bool {
    Url::parse(raw).is_ok_and(|url| url.scheme() == "https")
}

pub struct HttpListingDiscovery {
    client: Arc<HttpClient>,
    listing_url: Url,
    max_load_more: u32,
    anchor_selector: Selector,
}

impl HttpListingDiscovery {
    pub fn new(client: Arc<HttpClient>, listing_url: &str, max_load_more: u32) -> Result<Self> {
        let listing_url = Url::parse(listing_url)
            .with_context(|| format!("Invalid listing URL: {}", listing_url))?;
        let anchor_selector = Selector::parse(PRODUCT_ANCHOR_SELECTOR)
            .map_err(|e| anyhow!("Invalid product anchor selector: {}", e))?;

        Ok(Self {
            client,
            listing_url,
            max_load_more,
            anchor_selector,
        })
    }

    /// Listing page `page_number` (1-based), replacing any existing `page` parameter
    pub fn page_url(&self, page_number: u32) -> Url {
        let mut url = self.listing_url.clone();
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != PAGE_PARAM)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair(PAGE_PARAM, &page_number.to_string());
        url
    }

    /// Secure product links on one listing page, resolved against `base`
    pub fn harvest_links(&self, html: &str, base: &Url) -> Vec<String> {
        let document = Html::parse_document(html);
        document
            .select(&self.anchor_selector)
            .filter_map(|anchor| anchor.value().attr("href"))
            .filter_map(|href| base.join(href.trim()).ok())
            .filter(|url| url.scheme() == "https")
            .map(String::from)
            .collect()
    }
}

#[async_trait]
impl UrlDiscovery for HttpListingDiscovery {
    async fn discover(&self) -> Result<Vec<String>> {
        let mut collected = Vec::new();

        // Page 1 is the initial load; each activation appends the next page.
        for page_number in 1..=self.max_load_more.saturating_add(1) {
            let page_url = self.page_url(page_number);

            let html = match self.client.fetch_html_string(page_url.as_str()).await {
                Ok(html) => html,
                Err(e) => {
                    warn!("Listing page {} unavailable, stop loading: {}", page_number, e);
                    break;
                }
            };

            let links = self.harvest_links(&html, &page_url);
            if links.is_empty() {
                info!("Listing page {} has no products; stop loading", page_number);
                break;
            }

            debug!("Listing page {}: {} product links", page_number, links.len());
            collected.extend(links);

            if page_number > 1 {
                info!("Loaded more ({}/{})", page_number - 1, self.max_load_more);
            }
        }

        info!("Collected {} product links from {}", collected.len(), self.listing_url);
        Ok(collected)
    }

    fn source_name(&self) -> &str {
        self.listing_url.as_str()
    }
}

/// One raw URL per line; blank lines and `#` comments are ignored
pub struct FileUrlDiscovery {
    path: PathBuf,
    label: String,
}

impl FileUrlDiscovery {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let label = path.display().to_string();
        Self { path, label }
    }

    pub fn parse_lines(content: &str) -> Vec<String> {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter(|line| {
                let secure = is_secure_url(line);
                if !secure {
                    debug!("Discarding non-https entry: {}", line);
                }
                secure
            })
            .map(str::to_string)
            .collect()
    }
}

#[async_trait]
impl UrlDiscovery for FileUrlDiscovery {
    async fn discover(&self) -> Result<Vec<String>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read URL list {:?}", self.path))?;

        let urls = Self::parse_lines(&content);
        info!("Read {} product URLs from {:?}", urls.len(), self.path);
        Ok(urls)
    }

    fn source_name(&self) -> &str {
        &self.label
    }
}
