//! Delimited record reader
//!
//! [`FormatParser`] decodes the export with the schema's declared encoding,
//! reads the header row, checks every schema column is present and then yields
//! [`RawRecord`]s lazily, one per data line.

use super::column_mapping::ColumnMapping;
use super::schema::InstrumentSchema;
use crate::{Error, Result};
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};
use std::borrow::Cow;
use tracing::debug;

/// One data line as read from the export
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// 1-based line number in the source text
    pub line: usize,
    pub fields: StringRecord,
}

impl RawRecord {
    /// Field at a column index; missing trailing fields read as empty
    pub fn get(&self, index: usize) -> &str {
        self.fields.get(index).unwrap_or("")
    }
}

/// Parser for one instrument format
#[derive(Debug, Clone)]
pub struct FormatParser {
    schema: InstrumentSchema,
}

impl FormatParser {
    pub fn new(schema: InstrumentSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &InstrumentSchema {
        &self.schema
    }

    /// Decode raw bytes with the schema's declared encoding
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Result<Cow<'a, str>> {
        self.schema.encoding.decode(bytes)
    }

    /// Read the header and return a lazy iterator over the data lines
    pub fn records<'a>(&self, text: &'a str) -> Result<RawRecords<'a>> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.schema.delimiter_byte())
            .has_headers(true)
            .flexible(true)
            .quoting(false)
            .from_reader(text.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| Error::csv_parsing("Failed to read header row", Some(e)))?
            .clone();

        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(Error::csv_parsing("Input has no header row", None));
        }

        let mapping = ColumnMapping::analyze(&headers)?;
        mapping.resolve(&self.schema)?;

        debug!(
            "Header for format '{}' has {} columns ({} unused)",
            self.schema.name,
            mapping.len(),
            mapping.extra_columns(&self.schema).len()
        );

        Ok(RawRecords {
            mapping,
            inner: reader.into_records(),
        })
    }
}

/// Lazy iterator of raw records with the header mapping it was built from
pub struct RawRecords<'a> {
    mapping: ColumnMapping,
    inner: StringRecordsIntoIter<&'a [u8]>,
}

impl RawRecords<'_> {
    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }
}

impl Iterator for RawRecords<'_> {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|result| {
            let fields = result?;
            let line = fields
                .position()
                .map(|position| position.line() as usize)
                .unwrap_or_default();
            Ok(RawRecord { line, fields })
        })
    }
}
