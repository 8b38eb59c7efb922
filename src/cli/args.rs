//! Command-line argument definitions for the sounding processor
//!
//! This module defines the complete CLI interface using the clap derive API.
//! Every processing flag is optional so that unset flags fall through to the
//! config file and environment layers.

use crate::app::models::HainesElevation;
use crate::app::services::output_writer::TableFormat;
use crate::app::services::sounding_parser::Unit;
use crate::constants::MAX_WORKERS;
use crate::{Error, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

/// CLI arguments for the radiosonde sounding processor
///
/// Cleans vendor radiosonde telemetry into canonical profiles and derives the
/// parcel, Haines and mixing-height indices used in fire-weather forecasting.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "firesounding",
    version,
    about = "Process radiosonde soundings into canonical profiles and fire-weather indices",
    long_about = "Reads vendor-specific radiosonde exports (Windsond, iMet or custom column tables), \
                  cleans and harmonizes them into a pressure-descending profile, and computes CAPE, \
                  CIN, LCL, LFC, EL, the Haines Index and a mixing-height estimate. Writes the \
                  profile table (CSV or Parquet) and a JSON report per sounding."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Process sounding files into profile tables and index reports
    Process(ProcessArgs),
    /// List built-in and configured instrument formats
    Formats(FormatsArgs),
}

/// Arguments for the process command
#[derive(Debug, Clone, Parser)]
pub struct ProcessArgs {
    /// Sounding files, directories or glob patterns
    ///
    /// Directories are walked recursively for .txt, .tsv, .csv and .dat files.
    /// Quote glob patterns so the shell does not expand them.
    #[arg(value_name = "INPUT", required = true, num_args = 1..)]
    pub inputs: Vec<String>,

    /// Output directory for profile tables and reports
    ///
    /// Created if it does not exist. Defaults to the current directory.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        help = "Output directory for profile tables and reports"
    )]
    pub output_path: Option<PathBuf>,

    /// Instrument format identifier
    #[arg(
        short = 'f',
        long = "format",
        value_name = "FORMAT",
        help = "Instrument format (windsond, imet or a configured format)"
    )]
    pub format: Option<String>,

    /// Haines Index elevation class
    #[arg(
        long = "haines",
        value_enum,
        value_name = "CLASS",
        help = "Haines Index elevation class"
    )]
    pub haines: Option<HainesElevation>,

    /// Extra reference pressure levels (comma-separated, hPa)
    #[arg(
        long = "levels",
        value_name = "LIST",
        help = "Extra reference pressures merged with the standard levels",
        long_help = "Extra reference pressure levels in hPa as a comma-separated list, e.g. 975,900.\n\
                     They are merged with the standard RAOB levels used for barb and skew-T annotation."
    )]
    pub levels: Option<LevelList>,

    /// Wind unit of the written profile table
    #[arg(
        long = "wind-unit",
        value_name = "UNIT",
        help = "Wind unit for u/v in the profile table (m/s, knots, km/h, mph)"
    )]
    pub wind_unit: Option<Unit>,

    /// Profile table file format
    #[arg(
        long = "table",
        value_enum,
        value_name = "FORMAT",
        help = "Profile table file format"
    )]
    pub table_format: Option<TableFormat>,

    /// Upper bound on records accepted per sounding
    #[arg(
        long = "max-levels",
        value_name = "COUNT",
        help = "Maximum records accepted per sounding"
    )]
    pub max_levels: Option<usize>,

    /// Number of parallel workers
    ///
    /// Controls how many soundings are processed concurrently. Defaults to the
    /// number of CPUs.
    #[arg(
        short = 'j',
        long = "workers",
        value_name = "COUNT",
        help = "Number of soundings processed concurrently"
    )]
    pub workers: Option<usize>,

    /// Path to configuration file
    ///
    /// TOML configuration file for custom instrument formats and defaults. If
    /// not specified, looks for <config dir>/firesounding/config.toml
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Perform a dry run without writing output
    #[arg(
        long = "dry-run",
        help = "Show what would be processed without creating output files"
    )]
    pub dry_run: bool,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    ///
    /// Only show errors. Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Output format for the per-sounding summary
    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        help = "Output format for results"
    )]
    pub output_format: OutputFormat,
}

/// Arguments for the formats command
#[derive(Debug, Clone, Parser)]
pub struct FormatsArgs {
    /// Path to configuration file declaring custom formats
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Output format for the listing
    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        help = "Output format for the format listing"
    )]
    pub output_format: OutputFormat,

    /// Enable verbose logging output
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Enable verbose logging (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,
}

/// Output format options for results printed to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable index panel
    Human,
    /// JSON for scripting
    Json,
}

/// Wrapper for parsing comma-separated pressure lists
#[derive(Debug, Clone, PartialEq)]
pub struct LevelList {
    pub levels: Vec<f64>,
}

impl FromStr for LevelList {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let levels = s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<f64>()
                    .ok()
                    .filter(|level| level.is_finite() && *level > 0.0)
                    .ok_or_else(|| {
                        Error::configuration(format!(
                            "Invalid pressure level '{}': expected a positive number of hPa",
                            s
                        ))
                    })
            })
            .collect::<Result<Vec<f64>>>()?;

        if levels.is_empty() {
            return Err(Error::configuration("Level list cannot be empty"));
        }

        Ok(LevelList { levels })
    }
}

impl ProcessArgs {
    /// Validate the process command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(Error::configuration("At least one input is required"));
        }

        if let Some(workers) = self.workers {
            if workers == 0 {
                return Err(Error::configuration(
                    "Number of workers must be greater than 0",
                ));
            }
            if workers > MAX_WORKERS {
                return Err(Error::configuration(format!(
                    "Number of workers cannot exceed {}",
                    MAX_WORKERS
                )));
            }
        }

        if self.max_levels == Some(0) {
            return Err(Error::configuration(
                "Maximum levels must be greater than 0",
            ));
        }

        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }

        Ok(())
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            log_level_for(self.verbose)
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

impl FormatsArgs {
    pub fn get_log_level(&self) -> &'static str {
        log_level_for(self.verbose)
    }
}

fn log_level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

impl Default for ProcessArgs {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            output_path: None,
            format: None,
            haines: None,
            levels: None,
            wind_unit: None,
            table_format: None,
            max_levels: None,
            workers: None,
            config_file: None,
            dry_run: false,
            verbose: 0,
            quiet: false,
            output_format: OutputFormat::Human,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    #[test]
    fn test_cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_level_list_parsing() {
        let result = LevelList::from_str("975").unwrap();
        assert_eq!(result.levels, vec![975.0]);

        let result = LevelList::from_str(" 975 , 900.5 ").unwrap();
        assert_eq!(result.levels, vec![975.0, 900.5]);

        assert!(LevelList::from_str("").is_err());
        assert!(LevelList::from_str(",,").is_err());
        assert!(LevelList::from_str("975,abc").is_err());
        assert!(LevelList::from_str("-10").is_err());
    }

    #[test]
    fn test_parse_process_command() {
        let args = Args::try_parse_from([
            "firesounding",
            "process",
            "flight.txt",
            "soundings/",
            "-f",
            "imet",
            "--haines",
            "mid",
            "--levels",
            "975,900",
            "--wind-unit",
            "knots",
            "--table",
            "parquet",
            "-j",
            "2",
            "-vv",
        ])
        .unwrap();

        let Some(Commands::Process(process)) = args.command else {
            panic!("expected process command");
        };
        assert_eq!(process.inputs, vec!["flight.txt", "soundings/"]);
        assert_eq!(process.format.as_deref(), Some("imet"));
        assert_eq!(process.haines, Some(HainesElevation::Mid));
        assert_eq!(process.levels.as_ref().unwrap().levels, vec![975.0, 900.0]);
        assert_eq!(process.wind_unit, Some(Unit::Knots));
        assert_eq!(process.table_format, Some(TableFormat::Parquet));
        assert_eq!(process.workers, Some(2));
        assert_eq!(process.get_log_level(), "debug");
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Args::try_parse_from(["firesounding", "process", "a.txt", "-q", "-v"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_process_args_validation() {
        let args = ProcessArgs {
            inputs: vec!["flight.txt".to_string()],
            workers: Some(4),
            ..Default::default()
        };
        assert!(args.validate().is_ok());

        let mut invalid_args = args.clone();
        invalid_args.workers = Some(0);
        assert!(invalid_args.validate().is_err());

        invalid_args.workers = Some(MAX_WORKERS + 1);
        assert!(invalid_args.validate().is_err());

        let mut invalid_args = args.clone();
        invalid_args.max_levels = Some(0);
        assert!(invalid_args.validate().is_err());

        let mut invalid_args = args.clone();
        invalid_args.config_file = Some(PathBuf::from("/nonexistent/config.toml"));
        assert!(invalid_args.validate().is_err());

        let invalid_args = ProcessArgs::default();
        assert!(invalid_args.validate().is_err());
    }

    #[test]
    fn test_existing_config_file_passes_validation() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "").unwrap();

        let args = ProcessArgs {
            inputs: vec!["flight.txt".to_string()],
            config_file: Some(config_path),
            ..Default::default()
        };
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = ProcessArgs::default();
        assert_eq!(args.get_log_level(), "warn");

        args.verbose = 1;
        assert_eq!(args.get_log_level(), "info");

        args.verbose = 3;
        assert_eq!(args.get_log_level(), "trace");

        args.quiet = true;
        assert_eq!(args.get_log_level(), "error");
    }

    #[test]
    fn test_show_progress() {
        let mut args = ProcessArgs::default();
        assert!(args.show_progress());

        args.quiet = true;
        assert!(!args.show_progress());
    }
}
