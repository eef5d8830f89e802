//! Crawl run orchestration
//!
//! discover → dedup → batch crawl → export, inside one `crawl_run` span.

#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::domain::canonical_url::dedup_urls;
use crate::domain::services::{PageFetcher, UrlDiscovery};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::crawling_engine::{
    BatchCrawlingConfig, BatchCrawlingEngine, BatchReport, CrawlOutcome, FailedUrl,
};
use crate::infrastructure::csv_exporter::CsvExporter;
use crate::infrastructure::http_client::HttpClient;
use crate::infrastructure::listing_discovery::{FileUrlDiscovery, HttpListingDiscovery};
use crate::infrastructure::parsing::ProductPageParser;

/// Summary of one completed run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub source: String,
    /// Raw URLs returned by discovery
    pub discovered: usize,
    /// Distinct canonical URLs handed to the engine
    pub unique: usize,
    /// Rows written to the output file
    pub exported: usize,
    pub failures: Vec<FailedUrl>,
    pub batches: Vec<BatchReport>,
    pub cooldowns: usize,
    pub output_path: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

pub struct CrawlUseCase {
    discovery: Arc<dyn UrlDiscovery>,
    engine: BatchCrawlingEngine,
    exporter: CsvExporter,
}

impl CrawlUseCase {
    pub fn new(discovery: Arc<dyn UrlDiscovery>, engine: BatchCrawlingEngine, exporter: CsvExporter) -> Self {
        Self {
            discovery,
            engine,
            exporter,
        }
    }

    /// Wire the production components from a validated configuration.
    /// One HTTP client serves both discovery and product fetching.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = Arc::new(
            HttpClient::with_config(config.http.clone()).context("Failed to build HTTP client")?,
        );

        let discovery: Arc<dyn UrlDiscovery> = match &config.crawler.urls_file {
            Some(path) => Arc::new(FileUrlDiscovery::new(path)),
            None => Arc::new(HttpListingDiscovery::new(
                Arc::clone(&client),
                &config.crawler.listing_url,
                config.crawler.max_load_more,
            )?),
        };

        let parser = Arc::new(ProductPageParser::new().context("Failed to build page parser")?);
        let fetcher: Arc<dyn PageFetcher> = client;
        let engine = BatchCrawlingEngine::new(fetcher, parser, BatchCrawlingConfig::from(&config.batch));
        let exporter = CsvExporter::new(&config.crawler.output_path);

        Ok(Self::new(discovery, engine, exporter))
    }

    pub async fn run(&self) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let span = info_span!("crawl_run", run_id = %run_id);
        self.run_with_id(run_id).instrument(span).await
    }

    async fn run_with_id(&self, run_id: Uuid) -> Result<RunReport> {
        let source = self.discovery.source_name().to_string();
        info!("🚀 Starting crawl run from {}", source);

        let raw_urls = match self.discovery.discover().await {
            Ok(urls) => urls,
            Err(e) => {
                warn!("Discovery failed, continuing with no URLs: {:#}", e);
                Vec::new()
            }
        };
        let discovered = raw_urls.len();

        let urls = dedup_urls(&raw_urls);
        let unique = urls.len();
        info!("Collected {} unique product URLs ({} discovered)", unique, discovered);

        let CrawlOutcome {
            records,
            failures,
            batches,
            cooldowns,
            started_at,
            finished_at,
        } = self
            .engine
            .execute(urls)
            .await
            .context("Batch crawling could not start")?;

        let exported = self
            .exporter
            .write(&records)
            .with_context(|| format!("Failed to export results to {:?}", self.exporter.path()))?;

        let report = RunReport {
            run_id,
            source,
            discovered,
            unique,
            exported,
            failures,
            batches,
            cooldowns,
            output_path: self.exporter.path().to_path_buf(),
            started_at,
            finished_at,
        };

        log_summary(&report);
        Ok(report)
    }
}

fn log_summary(report: &RunReport) {
    info!(
        "✅ Run finished: {} discovered, {} unique, {} exported, {} failed, {} batches, {} cooldowns",
        report.discovered,
        report.unique,
        report.exported,
        report.failed(),
        report.batches.len(),
        report.cooldowns
    );

    for failure in &report.failures {
        warn!("Failed URL (batch {}): {} - {}", failure.batch_index, failure.url, failure.error);
    }

    info!("Saved {} products to {:?}", report.exported, report.output_path);
}
