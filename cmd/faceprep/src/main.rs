//! faceprep - build or extend the known-faces corpus from a directory of images.

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use facevault_ingest::{CancellationToken, Pipeline, PipelineConfig, RunSummary};
use facevault_oracle::SubprocessOracle;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Encode every new image in SOURCE_DIR and append it to the corpus at OUTPUT_PATH.
///
/// Images already present in the corpus (by file name) are skipped, so the
/// command can be re-run as new photos arrive.
#[derive(Parser, Debug)]
#[command(name = "faceprep")]
#[command(version)]
pub struct Args {
    /// Directory of .jpg/.jpeg/.png images (default: /fotosconhecidas)
    pub source_dir: Option<PathBuf>,

    /// Corpus file to create or extend (default: ../known_faces.bin)
    pub output_path: Option<PathBuf>,

    /// Config file (default is ~/.facevault/faceprep/config.yaml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Fixed number of concurrent workers
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Workers per available CPU when --workers is not set (default: 1)
    #[arg(long)]
    pub worker_multiplier: Option<f64>,

    /// Per-image oracle timeout in seconds, 0 to disable (default: 120)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Oracle executable (default: python3)
    #[arg(long)]
    pub oracle_program: Option<String>,

    /// Oracle argument placed before the image path; repeatable
    /// (default: scripts/face_encoder.py)
    #[arg(long = "oracle-arg", allow_hyphen_values = true)]
    pub oracle_args: Vec<String>,

    /// Verbose output
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let file = config::load(args.config.as_deref())?;
    let (pipeline_cfg, oracle_cfg) = config::resolve(&args, file);

    println!(
        "Processing images from {} and saving to {}",
        pipeline_cfg.source_dir.display(),
        pipeline_cfg.output_path.display()
    );

    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling remaining images");
            token.cancel();
        }
    });

    let oracle = SubprocessOracle::with_config(oracle_cfg);
    info!(
        "oracle: {} {}",
        oracle.config().program,
        oracle.config().args.join(" ")
    );

    let pipeline = Pipeline::new(pipeline_cfg, Arc::new(oracle));
    let summary = pipeline.run(cancel).await?;
    print_summary(&summary, pipeline.config());

    if summary.cancelled {
        anyhow::bail!(
            "run cancelled: {} of {} images processed",
            summary.processed() - summary.failures.iter().filter(|f| f.is_cancelled()).count(),
            summary.planned
        );
    }
    Ok(())
}

fn print_summary(summary: &RunSummary, cfg: &PipelineConfig) {
    println!();
    println!("=== Summary ===");
    println!("  Existing encodings:  {}", summary.loaded);
    println!("  Already processed:   {}", summary.skipped_known);
    println!("  Unsupported files:   {}", summary.skipped_unsupported);
    println!("  Processed:           {}", summary.processed());
    println!("  Succeeded:           {}", summary.succeeded);
    println!("  Failed:              {}", summary.failed());
    for f in &summary.failures {
        println!("    - {}: {}", f.name, f.cause);
    }

    if summary.persisted {
        println!(
            "Saved {} encodings ({} new) to {}",
            summary.total,
            summary.succeeded,
            cfg.output_path.display()
        );
    } else {
        println!("No new encodings to save.");
    }

    if let (Some(per_image), Some(rate)) =
        (summary.seconds_per_image(), summary.images_per_second())
    {
        println!("Total time:            {:.2?}", summary.elapsed);
        println!("Average per image:     {:.2} s", per_image);
        println!("Throughput:            {:.2} images/s", rate);
    }
}
