use clap::Parser;
use firesounding::cli::{args::Args, commands};
use std::process;
use tokio_util::sync::CancellationToken;

fn main() {
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        let cancellation_token = CancellationToken::new();

        let shutdown_signal = async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => cancellation_token.cancel(),
                Err(e) => {
                    eprintln!("Failed to install CTRL+C signal handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        tokio::select! {
            result = commands::run(args, cancellation_token.clone()) => {
                result
            }
            _ = shutdown_signal => {
                eprintln!("\nReceived CTRL+C, shutting down gracefully...");
                Err(firesounding::Error::processing_interrupted(
                    "Processing interrupted by user"
                ))
            }
        }
    });

    match result {
        Ok(_stats) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("firesounding - Radiosonde Sounding Processor");
    println!("============================================");
    println!();
    println!("Clean vendor radiosonde exports into canonical profiles and compute");
    println!("CAPE, CIN, LCL, LFC, EL, the Haines Index and mixing height.");
    println!();
    println!("USAGE:");
    println!("    firesounding <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    process     Process sounding files into profile tables and index reports");
    println!("    formats     List built-in and configured instrument formats");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Show help information");
    println!("    -V, --version    Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Process a Windsond export with default settings:");
    println!("    firesounding process flight.txt");
    println!();
    println!("    # Process a directory of iMet soundings into Parquet, winds in knots:");
    println!("    firesounding process soundings/ --format imet --table parquet \\");
    println!("                         --wind-unit knots --output out/");
    println!();
    println!("    # Use the high-elevation Haines variant with extra reference levels:");
    println!("    firesounding process flight.txt --haines high --levels 600,550");
    println!();
    println!("For detailed help on any command, use:");
    println!("    firesounding <COMMAND> --help");
}
