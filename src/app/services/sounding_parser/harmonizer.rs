//! Vendor column to canonical field mapping
//!
//! Driven entirely by the schema table: each source column is tagged with its
//! unit and converted to the canonical unit of its field.

use super::column_mapping::ColumnMapping;
use super::cleaner::CleanedRecord;
use super::schema::{ColumnSpec, InstrumentSchema};
use super::units::Measurement;
use crate::app::models::CanonicalField;
use crate::{Error, Result};

/// One record in canonical units, indexed by [`CanonicalField::index`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HarmonizedRecord {
    pub line: usize,
    pub values: [f64; 6],
}

impl HarmonizedRecord {
    pub fn get(&self, field: CanonicalField) -> f64 {
        self.values[field.index()]
    }
}

#[derive(Debug, Clone)]
pub struct UnitHarmonizer {
    columns: Vec<ColumnSpec>,
}

impl UnitHarmonizer {
    /// Bind the schema's mapping to a parsed header
    ///
    /// Fails with `UnknownColumn` when the table references a column the header
    /// does not carry.
    pub fn new(schema: &InstrumentSchema, mapping: &ColumnMapping) -> Result<Self> {
        if let Some(missing) = schema
            .columns
            .iter()
            .find(|column| !mapping.has_column(&column.source))
        {
            return Err(Error::unknown_column(&missing.source, missing.field.as_str()));
        }
        Ok(Self {
            columns: schema.columns.clone(),
        })
    }

    /// Convert one cleaned record onto canonical fields and units
    pub fn harmonize(&self, record: &CleanedRecord) -> Result<HarmonizedRecord> {
        let mut values = [0.0; 6];
        for column in &self.columns {
            let raw = record
                .get(&column.source)
                .ok_or_else(|| Error::unknown_column(&column.source, column.field.as_str()))?;
            values[column.field.index()] = Measurement::new(raw, column.unit).canonical();
        }
        Ok(HarmonizedRecord {
            line: record.line,
            values,
        })
    }
}
