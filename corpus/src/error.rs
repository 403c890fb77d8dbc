use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by corpus operations.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("corpus: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corpus: decode: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("corpus: encode: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("corpus: unsupported format version {got} (want {want})")]
    UnsupportedVersion { got: u32, want: u32 },

    #[error("corpus: corrupt store: {0}")]
    Corrupt(String),

    #[error("corpus: dimension mismatch for {name}: got {got}, want {want}")]
    DimensionMismatch {
        name: String,
        got: usize,
        want: usize,
    },

    #[error("corpus: duplicate name {0}")]
    DuplicateName(String),

    #[error("corpus: empty vector for {0}")]
    EmptyVector(String),
}

impl CorpusError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
