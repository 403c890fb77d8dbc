use std::path::PathBuf;
use std::time::Duration;

/// Default directory of known face images.
pub const DEFAULT_SOURCE_DIR: &str = "/fotosconhecidas";
/// Default corpus file.
pub const DEFAULT_OUTPUT_PATH: &str = "../known_faces.bin";
/// Default deadline for a single oracle call.
pub const DEFAULT_JOB_TIMEOUT: Duration = Duration::from_secs(120);

/// How many workers the pool runs.
///
/// Oracle calls are process-bound rather than CPU-bound, so `Auto` scales the
/// available hardware parallelism by a tunable multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorkerCount {
    Auto { multiplier: f64 },
    Fixed(usize),
}

impl Default for WorkerCount {
    fn default() -> Self {
        Self::Auto { multiplier: 1.0 }
    }
}

impl WorkerCount {
    /// Resolves the pool size for a batch of `jobs`.
    ///
    /// The result is at least 1 and never more than the number of jobs.
    pub fn resolve(self, jobs: usize) -> usize {
        let n = match self {
            Self::Fixed(n) => n,
            Self::Auto { multiplier } => {
                let cpus = std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1);
                let m = if multiplier.is_finite() && multiplier > 0.0 {
                    multiplier
                } else {
                    1.0
                };
                (cpus as f64 * m).round() as usize
            }
        };
        n.max(1).min(jobs.max(1))
    }
}

/// Builder-style configuration for [`Pipeline`](crate::Pipeline).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub source_dir: PathBuf,
    pub output_path: PathBuf,
    pub workers: WorkerCount,
    /// Per-job oracle deadline. `None` waits indefinitely.
    pub job_timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            workers: WorkerCount::default(),
            job_timeout: Some(DEFAULT_JOB_TIMEOUT),
        }
    }
}

impl PipelineConfig {
    pub fn with_source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dir = dir.into();
        self
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn with_workers(mut self, workers: WorkerCount) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_job_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.job_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_is_capped_by_jobs() {
        assert_eq!(WorkerCount::Fixed(8).resolve(3), 3);
        assert_eq!(WorkerCount::Fixed(2).resolve(10), 2);
    }

    #[test]
    fn never_zero() {
        assert_eq!(WorkerCount::Fixed(0).resolve(5), 1);
        assert_eq!(WorkerCount::Fixed(4).resolve(0), 1);
        assert!(WorkerCount::Auto { multiplier: 0.0 }.resolve(5) >= 1);
    }

    #[test]
    fn auto_scales_with_multiplier() {
        let cpus = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        let many = cpus * 10;
        assert_eq!(WorkerCount::Auto { multiplier: 1.0 }.resolve(many), cpus);
        assert_eq!(WorkerCount::Auto { multiplier: 2.0 }.resolve(many), cpus * 2);
        // Invalid multipliers fall back to 1.
        assert_eq!(WorkerCount::Auto { multiplier: -3.0 }.resolve(many), cpus);
        assert_eq!(WorkerCount::Auto { multiplier: f64::NAN }.resolve(many), cpus);
    }

    #[test]
    fn default_config() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.source_dir, PathBuf::from(DEFAULT_SOURCE_DIR));
        assert_eq!(cfg.output_path, PathBuf::from(DEFAULT_OUTPUT_PATH));
        assert_eq!(cfg.workers, WorkerCount::Auto { multiplier: 1.0 });
        assert_eq!(cfg.job_timeout, Some(DEFAULT_JOB_TIMEOUT));
    }
}
