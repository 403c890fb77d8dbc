use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use facevault_oracle::{Oracle, OracleError};
use futures::FutureExt;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::error::IngestError;
use crate::job::{Job, JobResult};

/// Pool sizing and per-job limits.
#[derive(Debug, Clone, Copy)]
pub struct PoolOptions {
    pub workers: usize,
    pub job_timeout: Option<Duration>,
}

/// WorkerPool fans jobs out to a fixed number of workers.
///
/// Every submitted job yields exactly one [`JobResult`] on the returned
/// channel. Once the run-scoped cancellation token fires, workers stop calling
/// the oracle (an in-flight call is abandoned and its process killed) and
/// answer every remaining job with [`OracleError::Cancelled`]. A panic inside
/// an oracle call is caught and reported as [`OracleError::Panicked`] for that
/// job alone.
pub struct WorkerPool;

/// Handle to the running workers.
///
/// Dropping the handle aborts any worker still running.
pub struct PoolHandle {
    workers: JoinSet<()>,
}

impl WorkerPool {
    /// Spawns the workers and enqueues `jobs`.
    ///
    /// The job queue and result channel are both sized to the batch, so
    /// neither side ever waits for buffer space.
    pub async fn start(
        oracle: Arc<dyn Oracle>,
        jobs: Vec<Job>,
        options: PoolOptions,
        cancel: CancellationToken,
    ) -> Result<(PoolHandle, mpsc::Receiver<JobResult>), IngestError> {
        let capacity = jobs.len().max(1);
        let (job_tx, job_rx) = mpsc::channel::<Job>(capacity);
        let (result_tx, result_rx) = mpsc::channel::<JobResult>(capacity);
        let queue = Arc::new(Mutex::new(job_rx));

        let mut workers = JoinSet::new();
        for id in 1..=options.workers.max(1) {
            workers.spawn(worker(
                id,
                Arc::clone(&oracle),
                Arc::clone(&queue),
                result_tx.clone(),
                options.job_timeout,
                cancel.clone(),
            ));
        }
        drop(result_tx);

        let total = jobs.len();
        for (sent, job) in jobs.into_iter().enumerate() {
            if job_tx.send(job).await.is_err() {
                return Err(IngestError::QueueClosed {
                    pending: total - sent,
                });
            }
        }
        // Closing the queue lets workers exit once it drains.
        drop(job_tx);

        Ok((PoolHandle { workers }, result_rx))
    }
}

impl PoolHandle {
    /// Number of workers not yet joined.
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Waits until every worker has exited.
    pub async fn join(mut self) -> Result<(), IngestError> {
        let mut panicked = 0;
        while let Some(res) = self.workers.join_next().await {
            if let Err(e) = res {
                error!("worker failed: {}", e);
                panicked += 1;
            }
        }
        if panicked > 0 {
            return Err(IngestError::WorkerPanicked(panicked));
        }
        Ok(())
    }
}

async fn worker(
    id: usize,
    oracle: Arc<dyn Oracle>,
    queue: Arc<Mutex<mpsc::Receiver<Job>>>,
    results: mpsc::Sender<JobResult>,
    job_timeout: Option<Duration>,
    cancel: CancellationToken,
) {
    let mut handled = 0usize;
    loop {
        let job = queue.lock().await.recv().await;
        let Some(job) = job else {
            break;
        };

        let result = if cancel.is_cancelled() {
            JobResult::failure(job.name, OracleError::Cancelled)
        } else {
            match encode(oracle.as_ref(), &job, job_timeout, &cancel).await {
                Ok(vector) => JobResult::success(job.name, vector),
                Err(cause) => JobResult::failure(job.name, cause),
            }
        };
        handled += 1;

        if results.send(result).await.is_err() {
            debug!("worker {} stopping: result receiver dropped", id);
            return;
        }
    }
    debug!("worker {} done after {} jobs", id, handled);
}

async fn encode(
    oracle: &dyn Oracle,
    job: &Job,
    job_timeout: Option<Duration>,
    cancel: &CancellationToken,
) -> Result<Vec<f32>, OracleError> {
    let guarded = AssertUnwindSafe(oracle.encode(&job.path))
        .catch_unwind()
        .map(|res| {
            res.unwrap_or_else(|payload| Err(OracleError::Panicked(panic_message(&*payload))))
        });
    let call = async {
        match job_timeout {
            Some(limit) => tokio::time::timeout(limit, guarded)
                .await
                .unwrap_or_else(|_| Err(OracleError::Timeout(limit))),
            None => guarded.await,
        }
    };

    tokio::select! {
        _ = cancel.cancelled() => Err(OracleError::Cancelled),
        res = call => res,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
