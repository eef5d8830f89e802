//! Infrastructure layer for HTTP access, parsing, crawling and export
//!
//! Concrete implementations of the domain seams plus configuration and
//! logging setup.

pub mod config;
pub mod crawling_engine;
pub mod csv_exporter;
pub mod http_client;
pub mod listing_discovery;
pub mod logging;
pub mod parsing;

// Re-export commonly used items
pub use config::{AppConfig, ConfigManager, ConfigSource, ConfigValidationError};
pub use crawling_engine::{
    BatchCrawlingConfig, BatchCrawlingEngine, BatchReport, CrawlError, CrawlOutcome, FailedUrl, TaskError,
};
pub use csv_exporter::{CsvExporter, ExportError};
pub use http_client::HttpClient;
pub use listing_discovery::{FileUrlDiscovery, HttpListingDiscovery};
pub use logging::{get_log_directory, init_logging_with_config};
pub use parsing::{ParsingError, ParsingResult, ProductPageParser};
