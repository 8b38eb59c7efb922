//! Field cleaning and numeric coercion
//!
//! Ground-station exports mark missing readings with runs of dashes and pad
//! columns with irregular whitespace. The cleaner folds both into the -99.9
//! sentinel or a plain number. Rows are never dropped here; that is left to
//! profile assembly so statistics stay honest.

use super::column_mapping::ColumnMapping;
use super::parser::RawRecord;
use super::schema::InstrumentSchema;
use crate::constants::SENTINEL;
use crate::{Error, Result};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static DASH_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-+(?: -+)*$").unwrap());

/// Schema columns coerced to numbers, keyed by source column name
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedRecord {
    pub line: usize,
    pub values: HashMap<String, f64>,
}

impl CleanedRecord {
    pub fn get(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied()
    }
}

/// Cleaner bound to the schema columns present in one header
#[derive(Debug, Clone)]
pub struct RecordCleaner {
    columns: Vec<(String, usize)>,
}

impl RecordCleaner {
    /// Bind the cleaner to the schema's columns; fails if one is missing
    pub fn for_schema(schema: &InstrumentSchema, mapping: &ColumnMapping) -> Result<Self> {
        let columns = schema
            .columns
            .iter()
            .map(|column| {
                mapping
                    .get_index(&column.source)
                    .map(|index| (column.source.clone(), index))
                    .ok_or_else(|| {
                        Error::schema_mismatch(&schema.name, column.field.as_str(), &column.source)
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { columns })
    }

    /// Clean and coerce every schema column of a record
    pub fn clean(&self, record: &RawRecord) -> Result<CleanedRecord> {
        let mut values = HashMap::with_capacity(self.columns.len());
        for (name, index) in &self.columns {
            let raw = record.get(*index);
            let value = coerce(&clean_field(raw))
                .ok_or_else(|| Error::invalid_numeric(record.line, name, raw))?;
            values.insert(name.clone(), value);
        }
        Ok(CleanedRecord {
            line: record.line,
            values,
        })
    }
}

/// Normalize one field: collapse whitespace, then fold dash runs to the sentinel
pub fn clean_field(raw: &str) -> String {
    let collapsed = WHITESPACE_RUN.replace_all(raw, " ");
    let trimmed = collapsed.trim();
    if trimmed.is_empty() || DASH_TOKEN.is_match(trimmed) {
        SENTINEL.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Parse a cleaned field; non-finite values are treated as unparseable
pub fn coerce(cleaned: &str) -> Option<f64> {
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
