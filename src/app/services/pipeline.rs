//! End-to-end sounding pipeline
//!
//! One parameterized path for every instrument format: decode, parse, clean,
//! harmonize, decompose wind, assemble the profile, then derive the reference
//! selection, parcel analysis, index set and hodograph samples. Every stage is a
//! synchronous function of its input plus the configuration captured at
//! construction, so a pipeline can be shared across worker threads.

use crate::app::models::{CanonicalLevel, IndexSet, Profile};
use crate::app::services::hodograph::{Hodograph, HodographSampler};
use crate::app::services::profile_builder::{AssemblyStats, ProfileAssembler};
use crate::app::services::resampler::{ReferenceSelection, VerticalResampler};
use crate::app::services::sounding_parser::{
    FormatParser, InstrumentSchema, ParseStats, RecordCleaner, UnitHarmonizer, WindDecomposer,
};
use crate::app::services::stability::StabilityIndexCalculator;
use crate::app::services::thermo::{ParcelAnalysis, ParcelAscentEngine};
use crate::config::Config;
use crate::{Error, Result};
use std::path::Path;
use tracing::{debug, info};

/// Everything derived from one sounding
#[derive(Debug, Clone)]
pub struct SoundingResult {
    /// Instrument format identifier the input was read with
    pub format: String,
    pub profile: Profile,
    pub selection: ReferenceSelection,
    pub parcel: ParcelAnalysis,
    pub indices: IndexSet,
    pub hodograph: Hodograph,
    pub parse_stats: ParseStats,
    pub assembly_stats: AssemblyStats,
}

#[derive(Debug, Clone)]
pub struct SoundingPipeline {
    parser: FormatParser,
    assembler: ProfileAssembler,
    resampler: VerticalResampler,
    engine: ParcelAscentEngine,
    calculator: StabilityIndexCalculator,
    sampler: HodographSampler,
}

impl SoundingPipeline {
    /// Build a pipeline for the configured instrument format
    pub fn new(config: &Config) -> Result<Self> {
        let schema = config.resolve_schema()?;
        schema.validate()?;
        debug!(
            "Pipeline for format '{}' ({} columns, {})",
            schema.name,
            schema.columns.len(),
            schema.encoding
        );

        Ok(Self {
            parser: FormatParser::new(schema),
            assembler: ProfileAssembler::new(config.processing.max_levels),
            resampler: VerticalResampler::new(config.reference_level_set()),
            engine: ParcelAscentEngine::new(),
            calculator: StabilityIndexCalculator::new(config.analysis.haines),
            sampler: config.hodograph_sampler(),
        })
    }

    pub fn schema(&self) -> &InstrumentSchema {
        self.parser.schema()
    }

    /// Decode and parse raw bytes into canonical levels, sentinels included
    pub fn parse(&self, bytes: &[u8]) -> Result<(Vec<CanonicalLevel>, ParseStats)> {
        let schema = self.parser.schema();
        let text = self.parser.decode(bytes)?;
        let records = self.parser.records(&text)?;

        let cleaner = RecordCleaner::for_schema(schema, records.mapping())?;
        let harmonizer = UnitHarmonizer::new(schema, records.mapping())?;

        let mut stats = ParseStats::new();
        stats.header_columns = records.mapping().len();

        let mut levels = Vec::new();
        for raw in records {
            let cleaned = cleaner.clean(&raw?)?;
            let level = WindDecomposer::decompose(&harmonizer.harmonize(&cleaned)?);
            stats.record(&level);
            self.assembler.check_size(stats.total_records)?;
            levels.push(level);
        }

        debug!(
            "Parsed {} records ({:.1}% complete, {} missing fields)",
            stats.total_records,
            stats.completeness_rate(),
            stats.sentinel_fields
        );
        Ok((levels, stats))
    }

    /// Run every stage over one sounding
    pub fn run(&self, bytes: &[u8]) -> Result<SoundingResult> {
        let (levels, parse_stats) = self.parse(bytes)?;

        let assembled = self.assembler.assemble(levels)?;
        let profile = assembled.profile;
        debug!("Assembly: {}", assembled.stats.summary());

        let selection = self.resampler.select(&profile);
        let parcel = self.engine.analyze(&profile)?;
        if let Err(reason) = parcel.require_convection() {
            debug!("{}; LFC and EL left undefined", reason);
        }
        let indices = self.calculator.compute(&profile, &parcel)?;
        let hodograph = self.sampler.sample(&profile);

        info!(
            "Sounding ({}): {} levels, CAPE {:.0} J/kg, CIN {:.0} J/kg, Haines {}",
            self.schema().name,
            profile.len(),
            indices.cape,
            indices.cin,
            indices.haines_index
        );

        Ok(SoundingResult {
            format: self.schema().name.clone(),
            profile,
            selection,
            parcel,
            indices,
            hodograph,
            parse_stats,
            assembly_stats: assembled.stats,
        })
    }

    /// Read a file and run the pipeline over its contents
    pub fn run_file(&self, path: &Path) -> Result<SoundingResult> {
        let bytes = std::fs::read(path)
            .map_err(|e| Error::io(format!("Failed to read {}", path.display()), e))?;
        debug!("Read {} bytes from {}", bytes.len(), path.display());
        self.run(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::HainesElevation;
    use crate::app::services::sounding_parser::tests::{
        WINDSOND_HEADER, latin1_bytes, windsond_text,
    };

    fn windsond_rows() -> String {
        windsond_text(&[
            ["1000", "30", "20", "10", "180"],
            ["950", "26", "18", "12", "190"],
            ["900", "22", "15", "14", "200"],
            ["850", "18", "10", "16", "210"],
            ["800", "14", "5", "18", "220"],
            ["750", "10", "--", "- -", "230"],
            ["700", "6", "-4", "20", "240"],
        ])
    }

    #[test]
    fn test_run_produces_full_result() {
        let pipeline = SoundingPipeline::new(&Config::default()).unwrap();
        let result = pipeline.run(&latin1_bytes(&windsond_rows())).unwrap();

        assert_eq!(result.format, "windsond");
        assert_eq!(result.profile.len(), 6);
        assert_eq!(result.parse_stats.total_records, 7);
        assert_eq!(result.parse_stats.complete_records, 6);
        assert_eq!(result.assembly_stats.sentinel_dropped, 1);
        assert!(result.indices.cape >= 0.0);
        assert!(result.indices.cin <= 0.0);
        assert!((2..=6).contains(&result.indices.haines_index));
        assert_eq!(result.indices.haines_elevation, HainesElevation::Low);
        assert!(!result.selection.is_empty());
    }

    #[test]
    fn test_wind_is_harmonized_to_meters_per_second() {
        let pipeline = SoundingPipeline::new(&Config::default()).unwrap();
        let result = pipeline.run(&latin1_bytes(&windsond_rows())).unwrap();

        let surface = result.profile.surface();
        assert!((surface.wind_speed - 10.0 * 0.514444).abs() < 1e-3);
        assert!(surface.v_wind < 0.0);
    }

    #[test]
    fn test_profile_too_large_is_reported_while_streaming() {
        let config = Config::default().with_max_levels(3);
        let pipeline = SoundingPipeline::new(&config).unwrap();

        let result = pipeline.run(&latin1_bytes(&windsond_rows()));
        assert!(matches!(
            result,
            Err(Error::ProfileTooLarge { levels: 4, limit: 3 })
        ));
    }

    #[test]
    fn test_all_missing_rows_yield_empty_profile() {
        let text = windsond_text(&[
            ["--", "20", "10", "5", "180"],
            ["900", "--", "--", "--", "--"],
        ]);
        let pipeline = SoundingPipeline::new(&Config::default()).unwrap();

        assert!(matches!(
            pipeline.run(&latin1_bytes(&text)),
            Err(Error::EmptyProfile { records_seen: 2 })
        ));
    }

    #[test]
    fn test_wrong_format_is_a_schema_mismatch() {
        let pipeline = SoundingPipeline::new(&Config::default().with_format("imet")).unwrap();
        let result = pipeline.run(windsond_rows().as_bytes());
        assert!(matches!(result, Err(Error::SchemaMismatch { .. })));
    }

    #[test]
    fn test_latin1_export_read_as_utf8_is_an_encoding_error() {
        let pipeline = SoundingPipeline::new(&Config::default().with_format("imet")).unwrap();
        let bytes = latin1_bytes(&format!("{}\n", WINDSOND_HEADER));
        assert!(matches!(pipeline.run(&bytes), Err(Error::Encoding { .. })));
    }

    #[test]
    fn test_stable_sounding_has_no_convection_but_succeeds() {
        let text = "Pressure (hPa)\tAir Temp (C)\tDewpoint (C)\tWind Speed (m/s)\tWind Dir (deg)\tAltitude (m)\n\
                    1000\t30\t0\t5\t180\t0\n\
                    900\t35\t-5\t6\t190\t950\n\
                    800\t30\t-10\t7\t200\t1950\n\
                    700\t25\t-20\t8\t210\t3050\n";
        let pipeline = SoundingPipeline::new(&Config::default().with_format("imet")).unwrap();
        let result = pipeline.run(text.as_bytes()).unwrap();

        assert!(matches!(
            result.parcel.require_convection(),
            Err(Error::NoConvectionFound)
        ));
        assert_eq!(result.indices.lfc_pressure, None);
        assert_eq!(result.indices.el_pressure, None);
        assert_eq!(result.indices.cape, 0.0);
        assert_eq!(result.indices.cin, 0.0);
    }

    #[test]
    fn test_unknown_format_fails_construction() {
        let config = Config::default().with_format("vaisala-rs41");
        assert!(matches!(
            SoundingPipeline::new(&config),
            Err(Error::UnknownFormat { .. })
        ));
    }
}
