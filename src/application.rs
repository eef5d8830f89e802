//! Application layer module
//!
//! Use cases that orchestrate discovery, crawling and export.

pub mod crawling_use_cases;

pub use crawling_use_cases::{CrawlUseCase, RunReport};
