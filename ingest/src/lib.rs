//! Incremental face corpus ingestion.
//!
//! [`Pipeline::run`] loads the existing corpus, plans one [`Job`] per image
//! not yet in it, fans the jobs out to a [`WorkerPool`] that calls the
//! [`Oracle`](facevault_oracle::Oracle), collects exactly one [`JobResult`]
//! per job, and merges the successes back into the corpus. The corpus is
//! rewritten only when at least one new vector was produced.
//!
//! Per-image failures never abort a run. Fatal errors are limited to an
//! unreadable source directory, a corrupt existing corpus, merge integrity
//! violations, and I/O failures while saving.

mod collector;
mod config;
mod error;
mod job;
mod pipeline;
mod pool;
mod source;

pub use collector::{Collected, collect};
pub use config::{
    DEFAULT_JOB_TIMEOUT, DEFAULT_OUTPUT_PATH, DEFAULT_SOURCE_DIR, PipelineConfig, WorkerCount,
};
pub use error::IngestError;
pub use job::{Job, JobFailure, JobResult};
pub use pipeline::{Pipeline, RunSummary};
pub use pool::{PoolHandle, PoolOptions, WorkerPool};
pub use source::{IMAGE_EXTENSIONS, JobPlan, is_image, plan_jobs};

pub use tokio_util::sync::CancellationToken;
