//! Profile table and index report output
//!
//! The profile table carries exactly `pressure, temperature, dewpoint, u_wind,
//! v_wind, altitude` in descending pressure, written through polars as CSV or
//! Parquet. The report is pretty JSON for the renderer (indices, reference-level
//! selection, hodograph samples, statistics). The text panel mirrors the index
//! box printed beside the skew-T.

use crate::app::models::{CanonicalLevel, IndexSet, Profile};
use crate::app::services::hodograph::Hodograph;
use crate::app::services::pipeline::SoundingResult;
use crate::app::services::profile_builder::AssemblyStats;
use crate::app::services::sounding_parser::{ParseStats, Unit};
use crate::config::Config;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Column order of the written profile table
pub const PROFILE_COLUMNS: [&str; 6] = [
    "pressure",
    "temperature",
    "dewpoint",
    "u_wind",
    "v_wind",
    "altitude",
];

/// File format for the profile table
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    #[default]
    Csv,
    Parquet,
}

impl TableFormat {
    pub fn extension(self) -> &'static str {
        match self {
            TableFormat::Csv => "csv",
            TableFormat::Parquet => "parquet",
        }
    }
}

/// Profile as a polars frame with u/v converted to `wind_unit`
pub fn profile_frame(profile: &Profile, wind_unit: Unit) -> Result<DataFrame> {
    let frame = df!(
        PROFILE_COLUMNS[0] => column(profile, |l| l.pressure),
        PROFILE_COLUMNS[1] => column(profile, |l| l.temperature),
        PROFILE_COLUMNS[2] => column(profile, |l| l.dewpoint),
        PROFILE_COLUMNS[3] => column(profile, |l| wind_unit.from_canonical(l.u_wind)),
        PROFILE_COLUMNS[4] => column(profile, |l| wind_unit.from_canonical(l.v_wind)),
        PROFILE_COLUMNS[5] => column(profile, |l| l.altitude),
    )?;
    Ok(frame)
}

fn column(profile: &Profile, value: impl Fn(&CanonicalLevel) -> f64) -> Vec<f64> {
    profile.iter().map(value).collect()
}

/// One selected reference level as shown in the report
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLevelRow {
    pub pressure: f64,
    pub temperature: f64,
    pub dewpoint: f64,
    pub u_wind: f64,
    pub v_wind: f64,
    pub altitude: f64,
}

/// JSON report handed to the renderer
#[derive(Debug, Serialize)]
pub struct SoundingReport<'a> {
    pub source: String,
    pub format: &'a str,
    pub generated_at: DateTime<Utc>,
    pub wind_unit: Unit,
    pub levels: usize,
    pub indices: &'a IndexSet,
    pub reference_levels: Vec<ReferenceLevelRow>,
    pub hodograph: &'a Hodograph,
    pub parse_stats: &'a ParseStats,
    pub assembly_stats: &'a AssemblyStats,
}

impl<'a> SoundingReport<'a> {
    pub fn new(source: impl Into<String>, result: &'a SoundingResult, wind_unit: Unit) -> Self {
        let reference_levels = result
            .selection
            .levels(&result.profile)
            .map(|level| ReferenceLevelRow {
                pressure: level.pressure,
                temperature: level.temperature,
                dewpoint: level.dewpoint,
                u_wind: wind_unit.from_canonical(level.u_wind),
                v_wind: wind_unit.from_canonical(level.v_wind),
                altitude: level.altitude,
            })
            .collect();

        Self {
            source: source.into(),
            format: &result.format,
            generated_at: Utc::now(),
            wind_unit,
            levels: result.profile.len(),
            indices: &result.indices,
            reference_levels,
            hodograph: &result.hodograph,
            parse_stats: &result.parse_stats,
            assembly_stats: &result.assembly_stats,
        }
    }
}

/// Index panel text: CAPE, CIN, LCL, LFC, EL, Haines, mixing height and surface readout
pub fn render_index_panel(indices: &IndexSet, wind_unit: Unit) -> String {
    let optional = |value: Option<f64>| match value {
        Some(pressure) => format!("{:.0} hPa", pressure),
        None => "--".to_string(),
    };
    let surface = &indices.surface;

    let mut panel = String::new();
    let _ = writeln!(panel, "CAPE: {:.0} J/kg", indices.cape);
    let _ = writeln!(panel, "CIN: {:.0} J/kg", indices.cin);
    let _ = writeln!(panel, "LCL: {:.0} hPa", indices.lcl_pressure);
    let _ = writeln!(panel, "LFC: {}", optional(indices.lfc_pressure));
    let _ = writeln!(panel, "EL: {}", optional(indices.el_pressure));
    let _ = writeln!(
        panel,
        "Haines: {} ({})",
        indices.haines_index, indices.haines_elevation
    );
    let _ = writeln!(panel, "Mixing Height: {:.0} m", indices.mixing_height);
    let _ = writeln!(
        panel,
        "Sfc Wind: {:.0} {} @ {:.0}°",
        wind_unit.from_canonical(surface.wind_speed),
        wind_unit.symbol(),
        surface.wind_direction
    );
    let _ = writeln!(panel, "Sfc T: {:.1} °C", surface.temperature);
    let _ = writeln!(panel, "Sfc RH: {:.0} %", surface.relative_humidity);
    let _ = writeln!(panel, "Sfc DD: {:.1} °C", surface.dewpoint_depression);
    panel
}

/// Paths written for one sounding
#[derive(Debug, Clone, PartialEq)]
pub struct OutputFiles {
    pub table: PathBuf,
    pub report: PathBuf,
}

/// Writes profile tables and JSON reports into one directory
#[derive(Debug, Clone)]
pub struct OutputWriter {
    output_dir: PathBuf,
    table_format: TableFormat,
    wind_unit: Unit,
}

impl OutputWriter {
    pub fn new(output_dir: PathBuf, table_format: TableFormat, wind_unit: Unit) -> Self {
        Self {
            output_dir,
            table_format,
            wind_unit,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.processing.output_dir.clone(),
            config.processing.table_format,
            config.processing.wind_unit,
        )
    }

    pub fn wind_unit(&self) -> Unit {
        self.wind_unit
    }

    /// Output paths for an input file stem
    pub fn output_paths(&self, stem: &str) -> OutputFiles {
        OutputFiles {
            table: self
                .output_dir
                .join(format!("{}_profile.{}", stem, self.table_format.extension())),
            report: self.output_dir.join(format!("{}_report.json", stem)),
        }
    }

    /// Write the profile table and report for one sounding
    pub fn write(&self, stem: &str, result: &SoundingResult) -> Result<OutputFiles> {
        let paths = self.output_paths(stem);

        self.write_table(&paths.table, &result.profile)?;
        let report = SoundingReport::new(stem, result, self.wind_unit);
        self.write_report(&paths.report, &report)?;

        info!(
            "Wrote {} and {}",
            paths.table.display(),
            paths.report.display()
        );
        Ok(paths)
    }

    fn write_table(&self, path: &Path, profile: &Profile) -> Result<()> {
        let mut frame = profile_frame(profile, self.wind_unit)?;
        let file = File::create(path)
            .map_err(|e| Error::io(format!("Failed to create {}", path.display()), e))?;

        match self.table_format {
            TableFormat::Csv => {
                CsvWriter::new(BufWriter::new(file))
                    .include_header(true)
                    .finish(&mut frame)?;
            }
            TableFormat::Parquet => {
                ParquetWriter::new(file)
                    .with_compression(ParquetCompression::Snappy)
                    .finish(&mut frame)?;
            }
        }

        debug!("Profile table: {} rows -> {}", frame.height(), path.display());
        Ok(())
    }

    fn write_report(&self, path: &Path, report: &SoundingReport<'_>) -> Result<()> {
        let file = File::create(path)
            .map_err(|e| Error::io(format!("Failed to create {}", path.display()), e))?;
        serde_json::to_writer_pretty(BufWriter::new(file), report)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::pipeline::SoundingPipeline;
    use crate::app::services::sounding_parser::wind::wind_components;
    use tempfile::TempDir;

    fn level(pressure: f64, temperature: f64, dewpoint: f64, speed: f64) -> CanonicalLevel {
        let (u_wind, v_wind) = wind_components(speed, 270.0);
        CanonicalLevel {
            pressure,
            temperature,
            dewpoint,
            wind_speed: speed,
            wind_direction: 270.0,
            altitude: (1000.0 - pressure) * 8.4,
            u_wind,
            v_wind,
        }
    }

    fn sounding_text() -> String {
        let rows = [
            "1000\t30\t20\t10\t180\t0",
            "950\t25\t18\t12\t190\t450",
            "900\t21\t15\t14\t200\t900",
            "850\t17\t10\t16\t210\t1400",
            "800\t13\t4\t18\t220\t1950",
            "700\t5\t-5\t20\t230\t3000",
            "500\t-12\t-25\t30\t240\t5600",
        ];
        format!(
            "Pressure (hPa)\tAir Temp (C)\tDewpoint (C)\tWind Speed (m/s)\tWind Dir (deg)\tAltitude (m)\n{}\n",
            rows.join("\n")
        )
    }

    fn run_imet() -> SoundingResult {
        let config = Config::default().with_format("imet");
        let pipeline = SoundingPipeline::new(&config).unwrap();
        pipeline.run(sounding_text().as_bytes()).unwrap()
    }

    #[test]
    fn test_profile_frame_columns_and_wind_unit() {
        let profile = Profile::new(vec![
            level(1000.0, 20.0, 10.0, 10.0),
            level(900.0, 14.0, 5.0, 20.0),
        ])
        .unwrap();

        let frame = profile_frame(&profile, Unit::Knots).unwrap();
        assert_eq!(frame.get_column_names_str(), PROFILE_COLUMNS.to_vec());
        assert_eq!(frame.height(), 2);

        let u = frame
            .column("u_wind")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap();
        let expected = Unit::Knots.from_canonical(-10.0);
        assert!((u.get(0).unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_index_panel_lines() {
        let result = run_imet();
        let panel = render_index_panel(&result.indices, Unit::Knots);

        let labels: Vec<&str> = panel
            .lines()
            .map(|line| line.split(':').next().unwrap())
            .collect();
        assert_eq!(
            labels,
            vec![
                "CAPE", "CIN", "LCL", "LFC", "EL", "Haines", "Mixing Height", "Sfc Wind",
                "Sfc T", "Sfc RH", "Sfc DD"
            ]
        );
        assert!(panel.contains("Sfc T: 30.0 °C"));
        assert!(panel.contains(" kt @ "));
    }

    #[test]
    fn test_write_csv_table_and_report() {
        let temp_dir = TempDir::new().unwrap();
        let writer = OutputWriter::new(
            temp_dir.path().to_path_buf(),
            TableFormat::Csv,
            Unit::MetersPerSecond,
        );
        let result = run_imet();

        let paths = writer.write("flight01", &result).unwrap();
        assert_eq!(paths.table, temp_dir.path().join("flight01_profile.csv"));

        let table = std::fs::read_to_string(&paths.table).unwrap();
        let mut lines = table.lines();
        assert_eq!(
            lines.next().unwrap(),
            "pressure,temperature,dewpoint,u_wind,v_wind,altitude"
        );
        assert_eq!(lines.count(), 7);

        let report: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&paths.report).unwrap()).unwrap();
        assert_eq!(report["format"], "imet");
        assert_eq!(report["levels"], 7);
        assert_eq!(report["wind_unit"], "meters_per_second");
        assert!(report["indices"]["cape"].as_f64().unwrap() >= 0.0);
        assert!(report["reference_levels"].as_array().unwrap().len() >= 5);
        assert!(report["generated_at"].is_string());
    }

    #[test]
    fn test_write_parquet_table() {
        let temp_dir = TempDir::new().unwrap();
        let writer = OutputWriter::new(
            temp_dir.path().to_path_buf(),
            TableFormat::Parquet,
            Unit::Knots,
        );
        let result = run_imet();

        let paths = writer.write("flight02", &result).unwrap();
        assert_eq!(paths.table.extension().unwrap(), "parquet");

        let frame = ParquetReader::new(File::open(&paths.table).unwrap())
            .finish()
            .unwrap();
        assert_eq!(frame.height(), 7);
        assert_eq!(frame.get_column_names_str(), PROFILE_COLUMNS.to_vec());
    }
}
