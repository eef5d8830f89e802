//! Batch crawling engine
//!
//! Runs fetch → extract → map for every URL, one batch at a time. Inside a
//! batch at most `max_concurrent` tasks hold a permit; each sleeps a small
//! random jitter before fetching. A batch is a hard barrier: the next one
//! starts only after every task has settled and the cooldown has elapsed.

#![allow(clippy::uninlined_format_args)]

use chrono::{DateTime, Utc};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::domain::batch::{BatchJob, PartitionError, partition};
use crate::domain::canonical_url::CanonicalUrl;
use crate::domain::product_record::ProductRecord;
use crate::domain::services::{FetchError, PageFetcher};
use crate::infrastructure::config::{BatchConfig, defaults};
use crate::infrastructure::parsing::{ParsingError, ProductPageParser};

/// Fatal engine errors; nothing is fetched when one is returned
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CrawlError {
    #[error(transparent)]
    Partition(#[from] PartitionError),

    #[error("Worker concurrency must be greater than 0")]
    ZeroConcurrency,

    #[error("Jitter range is inverted: {min:?} > {max:?}")]
    InvertedJitter { min: Duration, max: Duration },
}

/// Why one URL produced no record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Failed to parse {url}: {source}")]
    Parse { url: String, source: ParsingError },

    #[error("Task for {url} did not complete: {cause}")]
    Aborted { url: String, cause: String },
}

/// A URL that was skipped, with its cause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedUrl {
    pub url: CanonicalUrl,
    pub batch_index: usize,
    pub error: TaskError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub index: usize,
    pub size: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Batch order across batches, completion order within a batch
    pub records: Vec<ProductRecord>,
    pub failures: Vec<FailedUrl>,
    pub batches: Vec<BatchReport>,
    /// Number of inter-batch cooldown sleeps taken
    pub cooldowns: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlOutcome {
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.iter().map(|b| b.size).collect()
    }
}

/// Batch crawling settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchCrawlingConfig {
    pub batch_size: usize,
    pub cooldown: Duration,
    pub max_concurrent: usize,
    pub jitter_min: Duration,
    pub jitter_max: Duration,
}

impl Default for BatchCrawlingConfig {
    fn default() -> Self {
        Self {
            batch_size: defaults::BATCH_SIZE,
            cooldown: Duration::from_secs(defaults::COOLDOWN_SECONDS),
            max_concurrent: defaults::MAX_CONCURRENT,
            jitter_min: Duration::from_millis(defaults::JITTER_MIN_MS),
            jitter_max: Duration::from_millis(defaults::JITTER_MAX_MS),
        }
    }
}

impl From<&BatchConfig> for BatchCrawlingConfig {
    fn from(config: &BatchConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            cooldown: config.cooldown(),
            max_concurrent: config.max_concurrent,
            jitter_min: Duration::from_millis(config.jitter_min_ms),
            jitter_max: Duration::from_millis(config.jitter_max_ms),
        }
    }
}

impl BatchCrawlingConfig {
    fn random_jitter(&self) -> Duration {
        let min = u64::try_from(self.jitter_min.as_millis()).unwrap_or(u64::MAX);
        let max = u64::try_from(self.jitter_max.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(fastrand::u64(min..=max))
    }
}

pub struct BatchCrawlingEngine {
    fetcher: Arc<dyn PageFetcher>,
    parser: Arc<ProductPageParser>,
    config: BatchCrawlingConfig,
}

impl BatchCrawlingEngine {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        parser: Arc<ProductPageParser>,
        config: BatchCrawlingConfig,
    ) -> Self {
        Self {
            fetcher,
            parser,
            config,
        }
    }

    /// Crawl every URL. Per-URL failures are collected, never propagated;
    /// only invalid batch settings are an error.
    pub async fn execute(&self, urls: Vec<CanonicalUrl>) -> Result<CrawlOutcome, CrawlError> {
        if self.config.max_concurrent == 0 {
            return Err(CrawlError::ZeroConcurrency);
        }
        if self.config.jitter_min > self.config.jitter_max {
            return Err(CrawlError::InvertedJitter {
                min: self.config.jitter_min,
                max: self.config.jitter_max,
            });
        }

        let jobs = partition(urls, self.config.batch_size)?;
        let started_at = Utc::now();

        let mut outcome = CrawlOutcome {
            records: Vec::new(),
            failures: Vec::new(),
            batches: Vec::with_capacity(jobs.len()),
            cooldowns: 0,
            started_at,
            finished_at: started_at,
        };

        if jobs.is_empty() {
            info!("No URLs to crawl");
            return Ok(outcome);
        }

        for job in jobs {
            let report = self.run_batch(&job, &mut outcome).await;
            info!(
                "Batch {}/{} done: {} ok, {} failed in {:.1?}",
                report.index, job.total, report.succeeded, report.failed, report.elapsed
            );
            outcome.batches.push(report);

            if !job.is_last() {
                info!(
                    "Hit {} requests. Cooling down {:?} before batch {}/{}",
                    job.len(),
                    self.config.cooldown,
                    job.index + 1,
                    job.total
                );
                sleep(self.config.cooldown).await;
                outcome.cooldowns += 1;
            }
        }

        outcome.finished_at = Utc::now();
        Ok(outcome)
    }

    async fn run_batch(&self, job: &BatchJob, outcome: &mut CrawlOutcome) -> BatchReport {
        info!("== Batch {}/{}: {} URLs ==", job.index, job.total, job.len());
        let start = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent));

        let mut in_flight: FuturesUnordered<_> = job
            .urls
            .iter()
            .cloned()
            .map(|url| {
                let handle = tokio::spawn(crawl_one(
                    url.clone(),
                    Arc::clone(&self.fetcher),
                    Arc::clone(&self.parser),
                    Arc::clone(&semaphore),
                    self.config.random_jitter(),
                ));
                async move { (url, handle.await) }
            })
            .collect();

        let mut succeeded = 0;
        let mut failed = 0;

        while let Some((url, joined)) = in_flight.next().await {
            let result = joined.unwrap_or_else(|e| {
                Err(TaskError::Aborted {
                    url: url.to_string(),
                    cause: e.to_string(),
                })
            });

            match result {
                Ok(record) => {
                    debug!("✅ {}", url.slug());
                    succeeded += 1;
                    outcome.records.push(record);
                }
                Err(error) => {
                    warn!("❌ Skipping {}: {}", url, error);
                    failed += 1;
                    outcome.failures.push(FailedUrl {
                        url,
                        batch_index: job.index,
                        error,
                    });
                }
            }
        }

        BatchReport {
            index: job.index,
            size: job.len(),
            succeeded,
            failed,
            elapsed: start.elapsed(),
        }
    }
}

async fn crawl_one(
    url: CanonicalUrl,
    fetcher: Arc<dyn PageFetcher>,
    parser: Arc<ProductPageParser>,
    semaphore: Arc<Semaphore>,
    jitter: Duration,
) -> Result<ProductRecord, TaskError> {
    let _permit = semaphore.acquire_owned().await.map_err(|e| TaskError::Aborted {
        url: url.to_string(),
        cause: e.to_string(),
    })?;

    sleep(jitter).await;

    let html = fetcher.fetch_page(&url).await?;
    parser.parse(&html).map_err(|source| TaskError::Parse {
        url: url.to_string(),
        source,
    })
}
