//! Command-line flags, the highest-priority configuration layer

use clap::Parser;
use std::path::PathBuf;

use crate::infrastructure::config::AppConfig;

#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "product-export-crawler",
    version,
    about = "Crawl a product category and export WooCommerce-ready CSV rows"
)]
pub struct Cli {
    /// JSON configuration file (defaults to the per-user config file)
    #[arg(long, env = "PRODUCT_CRAWLER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Category listing page to harvest product links from
    #[arg(long)]
    pub listing_url: Option<String>,

    /// Maximum "load more" activations on the listing page
    #[arg(long)]
    pub max_load_more: Option<u32>,

    /// Read product URLs from this file (one per line) instead of the listing page
    #[arg(long)]
    pub urls_file: Option<PathBuf>,

    /// CSV output path
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// URLs per batch
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Seconds to pause between batches
    #[arg(long)]
    pub cooldown_secs: Option<u64>,

    /// Simultaneous product fetches
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Log level or filter directive (e.g. "debug" or "info,product_export_crawler=trace")
    #[arg(long)]
    pub log_level: Option<String>,

    /// Save the effective configuration to the config file and exit
    #[arg(long)]
    pub write_config: bool,
}

impl Cli {
    /// Overlay every flag that was given onto `config`
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(url) = &self.listing_url {
            config.crawler.listing_url.clone_from(url);
        }
        if let Some(cap) = self.max_load_more {
            config.crawler.max_load_more = cap;
        }
        if let Some(path) = &self.urls_file {
            config.crawler.urls_file = Some(path.clone());
        }
        if let Some(path) = &self.output {
            config.crawler.output_path.clone_from(path);
        }
        if let Some(size) = self.batch_size {
            config.batch.batch_size = size;
        }
        if let Some(secs) = self.cooldown_secs {
            config.batch.cooldown_seconds = secs;
        }
        if let Some(workers) = self.concurrency {
            config.batch.max_concurrent = workers;
        }
        if let Some(secs) = self.timeout_secs {
            config.http.request_timeout_seconds = secs;
        }
        if let Some(level) = &self.log_level {
            config.logging.level.clone_from(level);
        }
    }
}
