//! Command implementations for the sounding processor CLI
//!
//! Each subcommand lives in its own module; `shared` holds the logging,
//! configuration and progress helpers they have in common.

pub mod formats;
pub mod process;
pub mod shared;

pub use shared::ProcessingStats;

use crate::cli::args::{Args, Commands};
use crate::{Error, Result};
use tokio_util::sync::CancellationToken;

/// Dispatch to the selected subcommand
///
/// - `process`: sounding files to profile tables, reports and index panels
/// - `formats`: list of readable instrument formats
pub async fn run(args: Args, cancellation_token: CancellationToken) -> Result<ProcessingStats> {
    match args.command {
        Some(Commands::Process(process_args)) => {
            process::run_process(process_args, cancellation_token).await
        }
        Some(Commands::Formats(formats_args)) => formats::run_formats(formats_args).await,
        None => Err(Error::configuration("No command given")),
    }
}
