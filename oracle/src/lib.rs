//! Client for the external feature-extraction oracle.
//!
//! The oracle is a black-box process: it receives one image path as its last
//! argument and prints a single JSON envelope on stdout. On success the
//! envelope carries a base64 encoding of a little-endian `f32` array.
//!
//! [`Oracle`] is the seam the ingest pipeline depends on;
//! [`SubprocessOracle`] is the production implementation.

pub mod codec;
pub mod config;
pub mod error;
pub mod oracle;
pub mod subprocess;

pub use codec::{Envelope, decode_response, decode_vector, encode_vector};
pub use config::OracleConfig;
pub use error::OracleError;
pub use oracle::Oracle;
pub use subprocess::SubprocessOracle;
