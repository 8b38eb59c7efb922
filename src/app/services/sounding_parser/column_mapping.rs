//! Header analysis for instrument exports
//!
//! Builds a name to index lookup from the header row and resolves the columns an
//! [`InstrumentSchema`] requires.

use super::schema::InstrumentSchema;
use crate::app::models::CanonicalField;
use crate::{Error, Result};
use csv::StringRecord;
use std::collections::HashMap;

/// Column mapping for one parsed header
#[derive(Debug, Clone)]
pub struct ColumnMapping {
    /// Column name to index mapping
    pub name_to_index: HashMap<String, usize>,

    /// Header names in file order
    pub columns: Vec<String>,
}

impl ColumnMapping {
    /// Analyze a header row
    ///
    /// Header cells are trimmed and runs of internal whitespace collapsed to a
    /// single space. When a name repeats, the first occurrence wins.
    pub fn analyze(headers: &StringRecord) -> Result<Self> {
        let mut name_to_index = HashMap::new();
        let mut columns = Vec::with_capacity(headers.len());

        for (index, header) in headers.iter().enumerate() {
            let column_name = normalize_header(header);
            name_to_index.entry(column_name.clone()).or_insert(index);
            columns.push(column_name);
        }

        Ok(ColumnMapping {
            name_to_index,
            columns,
        })
    }

    /// Get the index for a given column name, normalized like the header cells
    pub fn get_index(&self, column_name: &str) -> Option<usize> {
        self.name_to_index
            .get(&normalize_header(column_name))
            .copied()
    }

    /// Check if a column exists in the mapping
    pub fn has_column(&self, column_name: &str) -> bool {
        self.get_index(column_name).is_some()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Resolve the source index of every canonical field in the schema
    ///
    /// Fails with `SchemaMismatch` naming the first required column that is
    /// absent from the header.
    pub fn resolve(&self, schema: &InstrumentSchema) -> Result<Vec<(CanonicalField, usize)>> {
        schema
            .columns
            .iter()
            .map(|column| {
                self.get_index(&column.source)
                    .map(|index| (column.field, index))
                    .ok_or_else(|| {
                        Error::schema_mismatch(
                            &schema.name,
                            column.field.as_str(),
                            &column.source,
                        )
                    })
            })
            .collect()
    }

    /// Source columns the schema does not use
    pub fn extra_columns(&self, schema: &InstrumentSchema) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|name| {
                !schema
                    .columns
                    .iter()
                    .any(|c| normalize_header(&c.source) == **name)
            })
            .map(String::as_str)
            .collect()
    }
}

/// Trim and collapse internal whitespace runs to one space
pub(crate) fn normalize_header(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
