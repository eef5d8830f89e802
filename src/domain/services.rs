//! Domain services
//!
//! Contains the interfaces the crawl pipeline depends on.

pub mod crawling_services;

pub use crawling_services::{FetchError, PageFetcher, UrlDiscovery};
