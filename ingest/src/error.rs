use std::path::PathBuf;

use facevault_corpus::CorpusError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("ingest: cannot list source directory {path}: {source}")]
    SourceDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Corpus(#[from] CorpusError),

    #[error("ingest: job queue closed with {pending} jobs unsent")]
    QueueClosed { pending: usize },

    #[error("ingest: expected {expected} results, received {received}")]
    MissingResults { expected: usize, received: usize },

    #[error("ingest: {0} worker(s) panicked")]
    WorkerPanicked(usize),
}
