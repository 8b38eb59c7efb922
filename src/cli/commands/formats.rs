//! Formats command implementation
//!
//! Lists the instrument formats the process command can read: the built-in
//! tables plus any `[formats.<id>]` tables from the configuration file.

use super::shared::{ProcessingStats, locate_config_file, setup_logging};
use crate::Result;
use crate::app::services::sounding_parser::InstrumentSchema;
use crate::cli::args::{FormatsArgs, OutputFormat};
use crate::config::Config;
use colored::*;
use tracing::info;

pub async fn run_formats(args: FormatsArgs) -> Result<ProcessingStats> {
    setup_logging(args.get_log_level(), false)?;

    let config_file = locate_config_file(args.config_file.as_deref());
    let config = Config::load_layered(config_file.as_deref())?;
    config.validate()?;

    let formats = config.available_formats();
    info!("{} instrument formats available", formats.len());

    match args.output_format {
        OutputFormat::Human => println!("{}", render_formats(&formats, &config.processing.format)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&formats)?),
    }

    Ok(ProcessingStats::default())
}

fn describe_delimiter(delimiter: char) -> String {
    match delimiter {
        '\t' => "tab".to_string(),
        ' ' => "space".to_string(),
        other => format!("'{}'", other),
    }
}

/// Human-readable listing; the configured default is marked
fn render_formats(formats: &[InstrumentSchema], default_format: &str) -> String {
    let mut lines = vec![format!("{}", "Instrument Formats".bright_green().bold())];

    for schema in formats {
        let marker = if schema.name == default_format {
            " (default)"
        } else {
            ""
        };
        lines.push(String::new());
        lines.push(format!("{}{}", schema.name.bright_white().bold(), marker));
        if !schema.description.is_empty() {
            lines.push(format!("  {}", schema.description));
        }
        lines.push(format!(
            "  Encoding: {}, delimiter: {}",
            schema.encoding,
            describe_delimiter(schema.delimiter)
        ));
        for column in &schema.columns {
            lines.push(format!(
                "    {:<20} -> {} [{}]",
                column.source,
                column.field.as_str(),
                column.unit.symbol()
            ));
        }
    }

    lines.join("\n")
}
