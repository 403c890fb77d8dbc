use std::sync::Arc;
use std::time::{Duration, Instant};

use facevault_oracle::Oracle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::collector::collect;
use crate::config::PipelineConfig;
use crate::error::IngestError;
use crate::job::JobFailure;
use crate::pool::{PoolOptions, WorkerPool};
use crate::source::plan_jobs;

/// Pipeline drives one incremental ingestion run.
pub struct Pipeline {
    config: PipelineConfig,
    oracle: Arc<dyn Oracle>,
}

/// What a run did.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Entries in the corpus before the run.
    pub loaded: usize,
    /// Jobs handed to the worker pool.
    pub planned: usize,
    pub skipped_known: usize,
    pub skipped_unsupported: usize,
    pub workers: usize,
    pub succeeded: usize,
    pub failures: Vec<JobFailure>,
    /// Entries in the corpus after the run.
    pub total: usize,
    /// Whether the corpus file was rewritten.
    pub persisted: bool,
    /// Whether the run was cancelled before every job reached the oracle.
    pub cancelled: bool,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn processed(&self) -> usize {
        self.succeeded + self.failed()
    }

    /// Average wall time per processed image.
    pub fn seconds_per_image(&self) -> Option<f64> {
        match self.processed() {
            0 => None,
            n => Some(self.elapsed.as_secs_f64() / n as f64),
        }
    }

    pub fn images_per_second(&self) -> Option<f64> {
        self.seconds_per_image()
            .filter(|s| *s > 0.0)
            .map(|s| 1.0 / s)
    }
}

impl Pipeline {
    pub fn new(config: PipelineConfig, oracle: Arc<dyn Oracle>) -> Self {
        Self { config, oracle }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs load, plan, encode, merge and persist.
    ///
    /// The corpus is only rewritten when at least one image was encoded.
    /// Successes collected before `cancel` fired are still merged and saved;
    /// the summary reports the cancellation.
    pub async fn run(&self, cancel: CancellationToken) -> Result<RunSummary, IngestError> {
        let start = Instant::now();
        let cfg = &self.config;

        let mut corpus = facevault_corpus::load(&cfg.output_path)?;
        let plan = plan_jobs(&cfg.source_dir, &corpus)?;

        let mut summary = RunSummary {
            loaded: corpus.len(),
            planned: plan.jobs.len(),
            skipped_known: plan.known.len(),
            skipped_unsupported: plan.unsupported.len(),
            ..Default::default()
        };

        if plan.jobs.is_empty() {
            info!("no new images to process");
            summary.total = corpus.len();
            summary.elapsed = start.elapsed();
            return Ok(summary);
        }

        summary.workers = cfg.workers.resolve(plan.jobs.len());
        info!(
            "processing {} images with {} workers",
            summary.planned, summary.workers
        );

        let (pool, mut results) = WorkerPool::start(
            Arc::clone(&self.oracle),
            plan.jobs,
            PoolOptions {
                workers: summary.workers,
                job_timeout: cfg.job_timeout,
            },
            cancel.clone(),
        )
        .await?;
        let collected = collect(pool, &mut results, summary.planned).await?;

        summary.succeeded = collected.successes.len();
        summary.failures = collected.failures;
        let cancelled = summary.failures.iter().filter(|f| f.is_cancelled()).count();
        if cancelled > 0 {
            summary.cancelled = true;
            warn!(
                "run cancelled: {} of {} images not processed",
                cancelled, summary.planned
            );
        }

        if collected.successes.is_empty() {
            info!("no new vectors to save");
        } else {
            corpus.merge(collected.successes)?;
            info!(
                "saving {} vectors ({} new) to {}",
                corpus.len(),
                summary.succeeded,
                cfg.output_path.display()
            );
            facevault_corpus::persist(&corpus, &cfg.output_path)?;
            summary.persisted = true;
        }

        summary.total = corpus.len();
        summary.elapsed = start.elapsed();
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_rates() {
        let s = RunSummary {
            succeeded: 3,
            elapsed: Duration::from_secs(6),
            ..Default::default()
        };
        assert_eq!(s.processed(), 3);
        assert_eq!(s.seconds_per_image(), Some(2.0));
        assert_eq!(s.images_per_second(), Some(0.5));
    }

    #[test]
    fn summary_rates_without_work() {
        let s = RunSummary::default();
        assert_eq!(s.seconds_per_image(), None);
        assert_eq!(s.images_per_second(), None);
    }
}
