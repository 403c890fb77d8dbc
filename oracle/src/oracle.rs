use std::path::Path;

use crate::error::OracleError;

/// Oracle converts one image into one feature vector.
///
/// Implementations must be safe for concurrent use (Send + Sync); the worker
/// pool shares a single instance across all workers.
#[async_trait::async_trait]
pub trait Oracle: Send + Sync {
    /// Return the feature vector for the image at `path`.
    async fn encode(&self, path: &Path) -> Result<Vec<f32>, OracleError>;
}
