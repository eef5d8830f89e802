//! Domain module - Core entities and service interfaces
//!
//! Value objects for product URLs and export rows, batch partitioning, and
//! the traits the crawl pipeline is written against.

pub mod batch;
pub mod canonical_url;
pub mod product_record;
pub mod services;

pub use batch::{BatchJob, PartitionError, partition};
pub use canonical_url::{CanonicalUrl, UrlError, dedup_urls, normalize};
pub use product_record::{ExportField, ProductRecord, StockStatus};
pub use services::{FetchError, PageFetcher, UrlDiscovery};
