//! Instrument text parser for radiosonde exports
//!
//! This module turns vendor-specific delimited telemetry into typed canonical
//! levels. Every instrument model names and scales its columns differently, so a
//! single parameterized path is driven by an [`InstrumentSchema`] table keyed by
//! format identifier.
//!
//! ## Architecture
//!
//! The parser is organized into logical components:
//! - [`encoding`] - Declared text encoding (UTF-8 or Latin-1) and decoding
//! - [`schema`] - Declarative column tables and the built-in instrument formats
//! - [`column_mapping`] - Header analysis and required-column resolution
//! - [`parser`] - Lazy record iteration over the delimited text
//! - [`cleaner`] - Dash/whitespace normalization and numeric coercion
//! - [`units`] - Unit tags and pure conversions onto canonical units
//! - [`harmonizer`] - Vendor column to canonical field mapping with conversion
//! - [`wind`] - Speed/direction decomposition into u/v components
//! - [`stats`] - Parsing statistics
//!
//! ## Usage
//!
//! ```rust
//! use firesounding::app::services::sounding_parser::{
//!     FormatParser, InstrumentSchema, RecordCleaner, UnitHarmonizer, WindDecomposer,
//! };
//!
//! # fn example(text: &str) -> firesounding::Result<()> {
//! let schema = InstrumentSchema::windsond();
//! let parser = FormatParser::new(schema.clone());
//! let records = parser.records(text)?;
//! let cleaner = RecordCleaner::for_schema(&schema, records.mapping())?;
//! let harmonizer = UnitHarmonizer::new(&schema, records.mapping())?;
//!
//! for raw in records {
//!     let cleaned = cleaner.clean(&raw?)?;
//!     let level = WindDecomposer::decompose(&harmonizer.harmonize(&cleaned)?);
//!     println!("{} hPa", level.pressure);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cleaner;
pub mod column_mapping;
pub mod encoding;
pub mod harmonizer;
pub mod parser;
pub mod schema;
pub mod stats;
pub mod units;
pub mod wind;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use cleaner::{CleanedRecord, RecordCleaner};
pub use column_mapping::ColumnMapping;
pub use encoding::TextEncoding;
pub use harmonizer::{HarmonizedRecord, UnitHarmonizer};
pub use parser::{FormatParser, RawRecord, RawRecords};
pub use schema::{ColumnSpec, InstrumentSchema};
pub use stats::ParseStats;
pub use units::{Measurement, Quantity, Unit};
pub use wind::WindDecomposer;
