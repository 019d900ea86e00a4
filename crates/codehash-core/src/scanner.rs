//! The scan driver: Sampler → CodeFetcher → fingerprint → TimelineBuilder.
//!
//! With `concurrency == 1` lookups run strictly one after another in
//! increasing height order. With more, up to `concurrency` lookups are in
//! flight at once. Each outcome is reduced to a `Sample` as soon as it lands
//! and folded in height order, so the result is identical to the sequential
//! run and no bytecode outlives its own lookup.

use futures::stream::{self, StreamExt};

use crate::address::Address;
use crate::error::{FetchError, ScanError};
use crate::fetcher::CodeFetcher;
use crate::fingerprint::CodeFingerprint;
use crate::sampler::Sampler;
use crate::timeline::TimelineBuilder;
use crate::types::{BlockHeight, Sample, ScanResult};

/// Upper bound on the sample buffer reserved up front.
const MAX_PREALLOCATED_SAMPLES: usize = 1 << 16;

/// Configuration for a single scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Contract address to audit.
    pub address: Address,
    /// First height (inclusive). Negative values are rejected.
    pub from_block: i64,
    /// Last height (inclusive). Negative values are rejected.
    pub to_block: i64,
    /// Sampling stride. Must be positive.
    pub step: i64,
    /// Maximum lookups in flight. `1` = sequential.
    pub concurrency: usize,
    /// Always probe `to_block`, even when it is not on the stride.
    pub include_end: bool,
    /// Emit a progress log line every N samples (0 = never).
    pub progress_every: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            address: Address::default(),
            from_block: 0,
            to_block: 0,
            step: 500,
            concurrency: 1,
            include_end: true,
            progress_every: 25,
        }
    }
}

/// Runs one scan against a [`CodeFetcher`].
#[derive(Debug)]
pub struct Scanner<F> {
    config: ScanConfig,
    sampler: Sampler,
    fetcher: F,
}

impl<F: CodeFetcher> Scanner<F> {
    /// Validate `config` and bind it to `fetcher`. No lookups happen here.
    pub fn new(config: ScanConfig, fetcher: F) -> Result<Self, ScanError> {
        let sampler = Sampler::new(config.from_block, config.to_block, config.step)?
            .with_end(config.include_end);
        if config.concurrency == 0 {
            return Err(ScanError::InvalidConfig(
                "concurrency must be at least 1".into(),
            ));
        }
        Ok(Self {
            config,
            sampler,
            fetcher,
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn sampler(&self) -> &Sampler {
        &self.sampler
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Run the scan to completion.
    ///
    /// Per-sample lookup failures are absorbed into `Unknown` samples; the
    /// only errors returned are internal ordering violations.
    pub async fn run(&self) -> Result<ScanResult, ScanError> {
        let total = self.sampler.sample_count();
        tracing::info!(
            address = %self.config.address,
            from = self.sampler.from_block(),
            to = self.sampler.to_block(),
            step = self.sampler.step(),
            samples = total,
            concurrency = self.config.concurrency,
            "Starting code-hash scan"
        );

        let capacity = usize::try_from(total)
            .unwrap_or(usize::MAX)
            .min(MAX_PREALLOCATED_SAMPLES);
        let mut timeline = TimelineBuilder::with_capacity(capacity);

        if self.config.concurrency <= 1 {
            self.run_sequential(&mut timeline, total).await?;
        } else {
            self.run_parallel(&mut timeline, total).await?;
        }

        let result = timeline.finish()?;
        tracing::info!(
            samples = result.samples.len(),
            segments = result.segments.len(),
            failed = result.failed_lookups.len(),
            changed = result.changed,
            "Scan complete"
        );
        Ok(result)
    }

    async fn run_sequential(
        &self,
        timeline: &mut TimelineBuilder,
        total: u64,
    ) -> Result<(), ScanError> {
        for (idx, block) in self.sampler.heights().enumerate() {
            let outcome = self.fetcher.fetch_code(&self.config.address, block).await;
            timeline.push(self.to_sample(block, outcome))?;
            self.log_progress(idx as u64 + 1, total, block);
        }
        Ok(())
    }

    async fn run_parallel(
        &self,
        timeline: &mut TimelineBuilder,
        total: u64,
    ) -> Result<(), ScanError> {
        // `buffered` yields in input order, i.e. by height, and keeps at most
        // `concurrency` lookups in flight.
        let mut samples = stream::iter(self.sampler.heights())
            .map(|block| async move {
                let outcome = self.fetcher.fetch_code(&self.config.address, block).await;
                self.to_sample(block, outcome)
            })
            .buffered(self.config.concurrency);

        let mut done = 0u64;
        while let Some(sample) = samples.next().await {
            let block = sample.block;
            timeline.push(sample)?;
            done += 1;
            self.log_progress(done, total, block);
        }
        Ok(())
    }

    fn to_sample(&self, block: BlockHeight, outcome: Result<Vec<u8>, FetchError>) -> Sample {
        let fingerprint = CodeFingerprint::from_fetch(&outcome);
        match &outcome {
            Err(e) if e.is_lookup_failure() => {
                tracing::warn!(block, error = %e, "code lookup failed; sample recorded as unknown");
            }
            _ => {
                tracing::debug!(block, fingerprint = %fingerprint, "sampled");
            }
        }
        Sample::new(block, fingerprint)
    }

    fn log_progress(&self, done: u64, total: u64, block: BlockHeight) {
        let every = self.config.progress_every;
        if every > 0 && (done % every == 0 || done == total) {
            tracing::info!(done, total, block, "Checking blocks");
        }
    }
}
