//! Test utilities for the instrument parser
//!
//! Fixture builders for windsond-style exports and a helper that drives the
//! whole parse → clean → harmonize → decompose chain.

use crate::Result;
use crate::app::models::CanonicalLevel;

use super::{FormatParser, InstrumentSchema, RecordCleaner, UnitHarmonizer, WindDecomposer};

mod parser_tests;

/// Windsond header with the vendor's extra columns around the schema ones
pub const WINDSOND_HEADER: &str =
    "Time [s]\tP [h Pa]\tT [°C]\tDew [°C]\tRH [%]\tWsp [kn]\tWdir [°]\tAltitude [m]";

/// Build a windsond export from (p, t, td, wsp, wdir) string rows
pub fn windsond_text(rows: &[[&str; 5]]) -> String {
    let mut text = String::from(WINDSOND_HEADER);
    for (i, [p, t, td, wsp, wdir]) in rows.iter().enumerate() {
        text.push('\n');
        text.push_str(&format!(
            "{}\t{}\t{}\t{}\t50\t{}\t{}\t{}",
            i * 2,
            p,
            t,
            td,
            wsp,
            wdir,
            i * 100
        ));
    }
    text
}

/// Encode text as Latin-1 bytes (every char must be below U+0100)
pub fn latin1_bytes(text: &str) -> Vec<u8> {
    text.chars().map(|c| c as u32 as u8).collect()
}

/// Run the full record chain over decoded text
pub fn parse_levels(schema: &InstrumentSchema, text: &str) -> Result<Vec<CanonicalLevel>> {
    let parser = FormatParser::new(schema.clone());
    let records = parser.records(text)?;
    let cleaner = RecordCleaner::for_schema(schema, records.mapping())?;
    let harmonizer = UnitHarmonizer::new(schema, records.mapping())?;

    let mut levels = Vec::new();
    for raw in records {
        let cleaned = cleaner.clean(&raw?)?;
        levels.push(WindDecomposer::decompose(&harmonizer.harmonize(&cleaned)?));
    }
    Ok(levels)
}
