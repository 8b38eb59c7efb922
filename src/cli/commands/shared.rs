//! Shared components for CLI commands
//!
//! This module contains common types, utilities, and functions used across
//! the command implementations.

use crate::cli::args::ProcessArgs;
use crate::config::Config;
use crate::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Processing statistics for reporting across all commands
#[derive(Debug, Clone, Default)]
pub struct ProcessingStats {
    /// Number of sounding files found
    pub files_found: usize,
    /// Number of soundings processed successfully
    pub files_processed: usize,
    /// Number of soundings that failed
    pub files_failed: usize,
    /// Profile levels written across all tables
    pub levels_written: usize,
    /// Total processing time
    pub processing_time: std::time::Duration,
    /// Output file sizes in bytes
    pub output_sizes: Vec<(String, u64)>,
}

impl ProcessingStats {
    /// Calculate total output size in bytes
    pub fn total_output_size(&self) -> u64 {
        self.output_sizes.iter().map(|(_, size)| size).sum()
    }

    /// Percentage of attempted soundings that succeeded
    pub fn success_rate(&self) -> f64 {
        let attempted = self.files_processed + self.files_failed;
        if attempted == 0 {
            0.0
        } else {
            (self.files_processed as f64 / attempted as f64) * 100.0
        }
    }

    /// Format output size in human-readable format
    pub fn format_size(bytes: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = bytes as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", bytes, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}

/// Set up structured logging on stderr
///
/// `RUST_LOG` overrides the level derived from the verbosity flags. Quiet mode
/// switches to the compact formatter without timestamps.
pub fn setup_logging(log_level: &str, quiet: bool) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("firesounding={}", log_level)));

    if quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Config file to load: the explicit one, else the default location if present
pub fn locate_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => Config::default_config_path()
            .ok()
            .filter(|path| path.exists()),
    }
}

/// Load configuration using layered approach (file -> env -> args)
pub fn load_configuration(args: &ProcessArgs) -> Result<Config> {
    info!("Loading configuration");

    let config_file = locate_config_file(args.config_file.as_deref());
    match &config_file {
        Some(path) => info!("Using config file: {}", path.display()),
        None => info!("No config file found, using defaults and environment variables"),
    }

    let mut config = Config::load_layered(config_file.as_deref())?;
    apply_cli_overrides(&mut config, args);
    config.validate()?;

    Ok(config)
}

/// Apply CLI argument overrides to configuration
pub fn apply_cli_overrides(config: &mut Config, args: &ProcessArgs) {
    if let Some(output_path) = &args.output_path {
        config.processing.output_dir = output_path.clone();
    }
    if let Some(format) = &args.format {
        config.processing.format = format.clone();
    }
    if let Some(table_format) = args.table_format {
        config.processing.table_format = table_format;
    }
    if let Some(wind_unit) = args.wind_unit {
        config.processing.wind_unit = wind_unit;
    }
    if let Some(max_levels) = args.max_levels {
        config.processing.max_levels = max_levels;
    }
    if let Some(workers) = args.workers {
        config.processing.workers = workers;
    }
    if let Some(haines) = args.haines {
        config.analysis.haines = haines;
    }
    if let Some(levels) = &args.levels {
        config
            .analysis
            .reference_levels
            .extend(levels.levels.iter().copied());
    }
}

/// Errors that stop a batch instead of failing a single file
pub fn is_critical_error(error: &Error) -> bool {
    error.is_configuration_error() || matches!(error, Error::ProcessingInterrupted { .. })
}

/// Create a progress bar with appropriate styling
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}
