//! Batch processing command for many statement files.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use stmtx_core::{ExtractedRecord, RecordSink, StatementExtractor};

use super::load_config;

const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg", "tif", "tiff", "bmp", "txt"];

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern of input files
    #[arg(required = true)]
    input: String,

    /// File the records are appended to (default from config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Give up on a single file after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    record: Option<ExtractedRecord>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let extractor = Arc::new(StatementExtractor::from_config(&config)?);
    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));
    let timeout = args.timeout_secs.map(Duration::from_secs);

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let handles: Vec<JoinHandle<ProcessResult>> = files
        .into_iter()
        .map(|path| {
            let extractor = Arc::clone(&extractor);
            let semaphore = Arc::clone(&semaphore);
            let pb = pb.clone();
            tokio::spawn(async move {
                let result = process_single_file(path, extractor, semaphore, timeout).await;
                pb.inc(1);
                result
            })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    let mut handles = handles.into_iter();

    while let Some(handle) = handles.next() {
        let result = handle.await?;

        if let Some(err) = &result.error {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", result.path.display(), err);
            } else {
                error!("Failed to process {}: {}", result.path.display(), err);
                for pending in handles.by_ref() {
                    pending.abort();
                }
                pb.abandon();
                anyhow::bail!("Processing failed for {}: {}", result.path.display(), err);
            }
        }

        results.push(result);
    }

    pb.finish_with_message("Complete");

    let records: Vec<ExtractedRecord> = results.iter().filter_map(|r| r.record.clone()).collect();
    let failed: Vec<&ProcessResult> = results.iter().filter(|r| r.error.is_some()).collect();

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| config.extraction.default_output.clone());
    if !records.is_empty() {
        RecordSink::new(&output).append_all(&records)?;
    }

    let total_ms: u64 = results.iter().map(|r| r.processing_time_ms).sum();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(records.len()).green(),
        style(failed.len()).red()
    );
    if !results.is_empty() {
        println!("   {}ms average per file", total_ms / results.len() as u64);
    }
    if !records.is_empty() {
        println!("   Records appended to {}", output.display());
    }

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

async fn process_single_file(
    path: PathBuf,
    extractor: Arc<StatementExtractor>,
    semaphore: Arc<Semaphore>,
    timeout: Option<Duration>,
) -> ProcessResult {
    let file_start = Instant::now();

    let task_path = path.clone();
    let outcome: anyhow::Result<ExtractedRecord> = async move {
        let permit = semaphore.acquire_owned().await?;
        debug!("Processing {}", task_path.display());

        // The permit lives as long as the blocking work, not the wait for it
        let task = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            extractor.extract_path(&task_path)
        });

        let extraction = match timeout {
            // The blocking task keeps running after a timeout; its result is dropped
            Some(limit) => tokio::time::timeout(limit, task)
                .await
                .map_err(|_| anyhow::anyhow!("timed out after {:?}", limit))???,
            None => task.await??,
        };

        Ok(extraction.record)
    }
    .await;

    let processing_time_ms = file_start.elapsed().as_millis() as u64;

    match outcome {
        Ok(record) => ProcessResult {
            path,
            record: Some(record),
            error: None,
            processing_time_ms,
        },
        Err(e) => ProcessResult {
            path,
            record: None,
            error: Some(e.to_string()),
            processing_time_ms,
        },
    }
}
