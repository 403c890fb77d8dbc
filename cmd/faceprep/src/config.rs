//! Configuration file loading and flag resolution.
//!
//! Values resolve as: command-line flag, then config file, then the library
//! default. The config file lives at ~/.facevault/faceprep/config.yaml unless
//! `--config` names another one.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use facevault_ingest::{PipelineConfig, WorkerCount};
use facevault_oracle::OracleConfig;
use serde::{Deserialize, Serialize};

use crate::Args;

pub const APP_NAME: &str = "faceprep";
/// Default base configuration directory name.
pub const DEFAULT_BASE_DIR: &str = ".facevault";
/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// On-disk configuration. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,

    /// Fixed worker count; overrides `worker_multiplier`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,

    /// Workers per available CPU.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_multiplier: Option<f64>,

    /// Per-image oracle deadline in seconds; 0 disables it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub oracle: OracleSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OracleSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_dir: Option<PathBuf>,
}

/// Gets the default config file path.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| {
        home.join(DEFAULT_BASE_DIR)
            .join(APP_NAME)
            .join(DEFAULT_CONFIG_FILE)
    })
}

/// Loads the config file.
///
/// An explicit path must exist. The default path is optional and an absent
/// file yields an empty config.
pub fn load(custom_path: Option<&Path>) -> Result<FileConfig> {
    let path = match custom_path {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) if p.exists() => p,
            _ => return Ok(FileConfig::default()),
        },
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg = serde_yaml::from_str(&content)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}

/// Combines flags, file values and defaults.
pub fn resolve(args: &Args, file: FileConfig) -> (PipelineConfig, OracleConfig) {
    let mut pipeline = PipelineConfig::default();
    if let Some(dir) = args.source_dir.clone().or(file.source_dir) {
        pipeline = pipeline.with_source_dir(dir);
    }
    if let Some(path) = args.output_path.clone().or(file.output_path) {
        pipeline = pipeline.with_output_path(path);
    }

    let workers = match (
        args.workers.or(file.workers),
        args.worker_multiplier.or(file.worker_multiplier),
    ) {
        (Some(n), _) => WorkerCount::Fixed(n),
        (None, Some(multiplier)) => WorkerCount::Auto { multiplier },
        (None, None) => WorkerCount::default(),
    };
    pipeline = pipeline.with_workers(workers);

    if let Some(secs) = args.timeout.or(file.timeout_secs) {
        let timeout = (secs > 0).then(|| Duration::from_secs(secs));
        pipeline = pipeline.with_job_timeout(timeout);
    }

    let mut oracle = OracleConfig::default();
    if let Some(program) = args.oracle_program.as_deref().or(file.oracle.program.as_deref()) {
        oracle = oracle.with_program(program);
    }
    if !args.oracle_args.is_empty() {
        oracle = oracle.with_args(args.oracle_args.iter().cloned());
    } else if let Some(file_args) = file.oracle.args {
        oracle = oracle.with_args(file_args);
    }
    if let Some(dir) = file.oracle.current_dir {
        oracle = oracle.with_current_dir(dir);
    }

    (pipeline, oracle)
}
