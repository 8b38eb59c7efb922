//! Process command implementation
//!
//! Resolves the inputs, then runs one pipeline per sounding on Tokio's blocking
//! pool with at most `workers` in flight. A failing sounding is reported and the
//! rest of the batch continues; configuration errors and Ctrl-C stop the batch.

use super::shared::{
    ProcessingStats, create_progress_bar, is_critical_error, load_configuration, setup_logging,
};
use crate::app::services::output_writer::{OutputFiles, OutputWriter, render_index_panel};
use crate::app::services::pipeline::{SoundingPipeline, SoundingResult};
use crate::cli::args::{OutputFormat, ProcessArgs};
use crate::cli::input::{output_stems, resolve_inputs};
use crate::config::Config;
use crate::{Error, Result};
use colored::*;
use futures::StreamExt;
use indicatif::{HumanDuration, ProgressBar};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// One successfully processed sounding
#[derive(Debug)]
struct FileOutcome {
    source: PathBuf,
    stem: String,
    outputs: OutputFiles,
    result: SoundingResult,
}

/// Process command runner
///
/// 1. Set up logging and configuration
/// 2. Resolve input files and prepare the output directory
/// 3. Process soundings concurrently with progress reporting
/// 4. Print per-sounding indices and a batch summary
pub async fn run_process(
    args: ProcessArgs,
    cancellation_token: CancellationToken,
) -> Result<ProcessingStats> {
    let start_time = Instant::now();

    setup_logging(args.get_log_level(), args.quiet)?;

    info!("Starting sounding processor");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;

    let config = load_configuration(&args)?;
    debug!("Loaded configuration: {:?}", config);

    let files = resolve_inputs(&args.inputs)
        .map_err(|e| Error::configuration(format!("{:#}", e)))?;
    let stems = output_stems(&files);
    info!("Found {} sounding files", files.len());

    if args.dry_run {
        return run_dry_run(&config, &files, &stems);
    }

    config.ensure_output_directory()?;

    let pipeline = Arc::new(SoundingPipeline::new(&config)?);
    let writer = Arc::new(OutputWriter::from_config(&config));
    let workers = config.processing.workers;

    let progress_bar = if args.show_progress() && files.len() > 1 {
        Some(create_progress_bar(
            files.len() as u64,
            &format!("Processing soundings with {} workers", workers),
        ))
    } else {
        None
    };

    let mut stats = ProcessingStats {
        files_found: files.len(),
        ..Default::default()
    };

    let mut outcomes = futures::stream::iter(files.into_iter().zip(stems))
        .map(|(path, stem)| {
            let pipeline = Arc::clone(&pipeline);
            let writer = Arc::clone(&writer);
            let token = cancellation_token.clone();
            async move {
                if token.is_cancelled() {
                    let error = Error::processing_interrupted("cancelled before start");
                    return (path, Err(error));
                }
                let task_path = path.clone();
                let outcome = tokio::task::spawn_blocking(move || {
                    process_file(&pipeline, &writer, task_path, stem)
                })
                .await
                .unwrap_or_else(|e| {
                    Err(Error::processing_interrupted(format!(
                        "worker task failed: {}",
                        e
                    )))
                });
                (path, outcome)
            }
        })
        .buffer_unordered(workers);

    while let Some((path, outcome)) = outcomes.next().await {
        if let Some(pb) = &progress_bar {
            pb.inc(1);
        }

        match outcome {
            Ok(outcome) => {
                stats.files_processed += 1;
                stats.levels_written += outcome.result.profile.len();
                record_output_sizes(&mut stats, &outcome.outputs);
                emit(
                    progress_bar.as_ref(),
                    &describe_outcome(&outcome, &writer, args.output_format)?,
                );
            }
            Err(e) => {
                error!("Failed to process {}: {}", path.display(), e);
                stats.files_failed += 1;
                emit(
                    progress_bar.as_ref(),
                    &format!("{} {}: {}", "FAILED".bright_red().bold(), path.display(), e),
                );

                if is_critical_error(&e) {
                    if let Some(pb) = &progress_bar {
                        pb.abandon_with_message("Stopped");
                    }
                    return Err(e);
                }
            }
        }
    }

    if let Some(pb) = &progress_bar {
        pb.finish_with_message("Processing complete");
    }

    stats.processing_time = start_time.elapsed();
    generate_final_report(&args, &stats)?;

    if stats.files_failed > 0 {
        return Err(Error::BatchFailed {
            failed: stats.files_failed,
            total: stats.files_found,
        });
    }

    Ok(stats)
}

/// Run the pipeline over one file and write its outputs
fn process_file(
    pipeline: &SoundingPipeline,
    writer: &OutputWriter,
    source: PathBuf,
    stem: String,
) -> Result<FileOutcome> {
    info!("Processing {}", source.display());
    let result = pipeline.run_file(&source)?;
    let outputs = writer.write(&stem, &result)?;

    Ok(FileOutcome {
        source,
        stem,
        outputs,
        result,
    })
}

/// Show what would be processed without writing anything
fn run_dry_run(config: &Config, files: &[PathBuf], stems: &[String]) -> Result<ProcessingStats> {
    info!("Performing dry run - no files will be created");

    let schema = config.resolve_schema()?;
    let writer = OutputWriter::from_config(config);

    for (file, stem) in files.iter().zip(stems) {
        let outputs = writer.output_paths(stem);
        println!(
            "{} ({}) -> {}, {}",
            file.display(),
            schema.name,
            outputs.table.display(),
            outputs.report.display()
        );
    }

    info!("Dry run complete: {} files would be processed", files.len());

    Ok(ProcessingStats {
        files_found: files.len(),
        ..Default::default()
    })
}

fn record_output_sizes(stats: &mut ProcessingStats, outputs: &OutputFiles) {
    for path in [&outputs.table, &outputs.report] {
        if let Ok(metadata) = std::fs::metadata(path) {
            stats
                .output_sizes
                .push((display_name(path), metadata.len()));
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Print above the progress bar when one is active
fn emit(progress_bar: Option<&ProgressBar>, text: &str) {
    match progress_bar {
        Some(pb) => pb.println(text),
        None => println!("{}", text),
    }
}

/// Per-sounding stdout block
fn describe_outcome(
    outcome: &FileOutcome,
    writer: &OutputWriter,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Human => {
            let header = format!(
                "{} ({}, {} levels)",
                outcome.stem.bright_cyan().bold(),
                outcome.source.display(),
                outcome.result.profile.len()
            );
            Ok(format!(
                "{}\n{}",
                header,
                render_index_panel(&outcome.result.indices, writer.wind_unit())
            ))
        }
        OutputFormat::Json => {
            let summary = serde_json::json!({
                "source": outcome.source.display().to_string(),
                "format": outcome.result.format,
                "levels": outcome.result.profile.len(),
                "table": outcome.outputs.table.display().to_string(),
                "report": outcome.outputs.report.display().to_string(),
                "indices": outcome.result.indices,
            });
            Ok(serde_json::to_string(&summary)?)
        }
    }
}

/// Generate final processing report
fn generate_final_report(args: &ProcessArgs, stats: &ProcessingStats) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if args.quiet {
                return Ok(());
            }
            generate_human_report(stats);
            Ok(())
        }
        OutputFormat::Json => generate_json_report(stats),
    }
}

fn generate_human_report(stats: &ProcessingStats) {
    let duration = HumanDuration(stats.processing_time);
    let total_size = ProcessingStats::format_size(stats.total_output_size());

    println!("\n{}", "Processing Summary".bright_green().bold());
    println!("  Soundings found:     {}", stats.files_found);
    println!(
        "  Soundings processed: {}",
        stats.files_processed.to_string().bright_white().bold()
    );
    if stats.files_failed > 0 {
        println!(
            "  Soundings failed:    {}",
            stats.files_failed.to_string().bright_red().bold()
        );
    }
    println!("  Success rate:        {:.1}%", stats.success_rate());
    println!("  Levels written:      {}", stats.levels_written);
    println!("  Output size:         {}", total_size);
    println!("  Processing time:     {}", duration);
}

fn generate_json_report(stats: &ProcessingStats) -> Result<()> {
    let json_stats = serde_json::json!({
        "files_found": stats.files_found,
        "files_processed": stats.files_processed,
        "files_failed": stats.files_failed,
        "levels_written": stats.levels_written,
        "success_rate_percent": stats.success_rate(),
        "processing_time_seconds": stats.processing_time.as_secs_f64(),
        "total_output_size_bytes": stats.total_output_size(),
        "output_files": stats.output_sizes.iter().map(|(name, size)| {
            serde_json::json!({
                "filename": name,
                "size_bytes": size
            })
        }).collect::<Vec<_>>()
    });

    println!("{}", serde_json::to_string_pretty(&json_stats)?);
    Ok(())
}
