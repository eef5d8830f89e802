//! Batch partitioning for rate-limited crawling

use thiserror::Error;

use super::canonical_url::CanonicalUrl;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PartitionError {
    #[error("Batch size must be greater than 0")]
    ZeroBatchSize,
}

/// URLs processed together before a cooldown pause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    /// 1-based position of this batch in the run
    pub index: usize,
    /// Number of batches in the run
    pub total: usize,
    pub urls: Vec<CanonicalUrl>,
}

impl BatchJob {
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub const fn is_last(&self) -> bool {
        self.index == self.total
    }
}

/// Split URLs into consecutive batches of at most `batch_size`; the last may be smaller.
pub fn partition(urls: Vec<CanonicalUrl>, batch_size: usize) -> Result<Vec<BatchJob>, PartitionError> {
    if batch_size == 0 {
        return Err(PartitionError::ZeroBatchSize);
    }

    let total = urls.len().div_ceil(batch_size);
    let mut batches = Vec::with_capacity(total);
    let mut remaining = urls.into_iter().peekable();
    let mut index = 0;

    while remaining.peek().is_some() {
        index += 1;
        let chunk: Vec<CanonicalUrl> = remaining.by_ref().take(batch_size).collect();
        batches.push(BatchJob { index, total, urls: chunk });
    }

    Ok(batches)
}
