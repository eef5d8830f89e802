//! Product Export Crawler
//!
//! Discovers product pages on an e-commerce category listing, fetches them
//! in rate-limited batches, reads their JSON-LD product data and exports
//! WooCommerce-ready CSV rows.

// Module declarations
pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;

pub use application::{CrawlUseCase, RunReport};
pub use domain::{CanonicalUrl, ExportField, ProductRecord, StockStatus};
pub use infrastructure::{AppConfig, ConfigManager};
