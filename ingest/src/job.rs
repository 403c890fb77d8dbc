use std::path::PathBuf;

use facevault_corpus::NamedVector;
use facevault_oracle::OracleError;

/// One image awaiting encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub path: PathBuf,
    /// Dedup key and corpus name: the file name.
    pub name: String,
}

/// An image the oracle could not encode.
#[derive(Debug)]
pub struct JobFailure {
    pub name: String,
    pub cause: OracleError,
}

impl JobFailure {
    pub fn is_cancelled(&self) -> bool {
        matches!(self.cause, OracleError::Cancelled)
    }
}

/// Outcome of exactly one [`Job`].
#[derive(Debug)]
pub enum JobResult {
    Success(NamedVector),
    Failure(JobFailure),
}

impl JobResult {
    pub fn success(name: impl Into<String>, vector: Vec<f32>) -> Self {
        Self::Success(NamedVector::new(name, vector))
    }

    pub fn failure(name: impl Into<String>, cause: OracleError) -> Self {
        Self::Failure(JobFailure {
            name: name.into(),
            cause,
        })
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Success(nv) => &nv.name,
            Self::Failure(f) => &f.name,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}
