use std::time::Instant;

use facevault_corpus::NamedVector;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::error::IngestError;
use crate::job::{JobFailure, JobResult};
use crate::pool::PoolHandle;

/// Results of one batch, split by outcome.
#[derive(Debug, Default)]
pub struct Collected {
    /// Successful encodings in completion order.
    pub successes: Vec<NamedVector>,
    pub failures: Vec<JobFailure>,
}

impl Collected {
    pub fn processed(&self) -> usize {
        self.successes.len() + self.failures.len()
    }
}

/// Receives exactly `expected` results and waits for the pool to quiesce.
///
/// Failures are logged and kept out of `successes`; they never fail the
/// batch. The call returns only after every worker has exited, so nothing is
/// still running when the caller goes on to persist. If the result channel
/// closes before `expected` results arrive, the batch is reported as
/// incomplete.
pub async fn collect(
    pool: PoolHandle,
    results: &mut mpsc::Receiver<JobResult>,
    expected: usize,
) -> Result<Collected, IngestError> {
    let start = Instant::now();
    let mut collected = Collected::default();

    while collected.processed() < expected {
        let Some(result) = results.recv().await else {
            break;
        };
        match result {
            JobResult::Success(nv) => collected.successes.push(nv),
            JobResult::Failure(f) => {
                warn!("failed to process {}: {}", f.name, f.cause);
                collected.failures.push(f);
            }
        }

        let processed = collected.processed();
        let secs = start.elapsed().as_secs_f64();
        let rate = if secs > 0.0 { processed as f64 / secs } else { 0.0 };
        info!("processed {}/{} ({:.2} images/sec)", processed, expected, rate);
    }

    pool.join().await?;

    let received = collected.processed();
    if received < expected {
        return Err(IngestError::MissingResults { expected, received });
    }
    Ok(collected)
}
