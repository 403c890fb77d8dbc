use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OracleError {
    #[error("oracle: failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("oracle: io: {0}")]
    Io(#[from] std::io::Error),

    #[error("oracle: exited with {status}: {stderr}")]
    Exit { status: ExitStatus, stderr: String },

    #[error("oracle: timed out after {0:?}")]
    Timeout(Duration),

    #[error("oracle: invalid response: {reason}; stderr: {stderr}")]
    InvalidResponse { reason: String, stderr: String },

    #[error("oracle: rejected: {0}")]
    Rejected(String),

    #[error("oracle: success response without encoding")]
    MissingEncoding,

    #[error("oracle: base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("oracle: malformed payload: {len} bytes is not a multiple of 4")]
    MalformedPayload { len: usize },

    #[error("oracle: empty vector")]
    EmptyVector,

    #[error("oracle: cancelled")]
    Cancelled,

    #[error("oracle: panicked: {0}")]
    Panicked(String),
}
