//! Declarative instrument schemas
//!
//! An [`InstrumentSchema`] names the source columns an instrument export carries,
//! the canonical field each one feeds and the unit it is written in. Adding a new
//! sonde model means adding a table here (or in the configuration file), never a
//! new parser.

use super::encoding::TextEncoding;
use super::units::{Quantity, Unit};
use super::column_mapping::normalize_header;
use crate::app::models::CanonicalField;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One source column and where it lands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Exact header text in the export
    pub source: String,
    pub field: CanonicalField,
    pub unit: Unit,
}

impl ColumnSpec {
    pub fn new(source: impl Into<String>, field: CanonicalField, unit: Unit) -> Self {
        Self {
            source: source.into(),
            field,
            unit,
        }
    }
}

/// Column table for one instrument export format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSchema {
    /// Format identifier; filled from the table key when loaded from a config file
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub encoding: TextEncoding,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    pub columns: Vec<ColumnSpec>,
}

fn default_delimiter() -> char {
    '\t'
}

impl InstrumentSchema {
    /// Windsond ground-station export: Latin-1, tab separated, wind in knots
    pub fn windsond() -> Self {
        Self {
            name: "windsond".to_string(),
            description: "Windsond tab-separated export (Latin-1, wind in knots)".to_string(),
            encoding: TextEncoding::Latin1,
            delimiter: '\t',
            columns: vec![
                ColumnSpec::new("P [h Pa]", CanonicalField::Pressure, Unit::Hectopascal),
                ColumnSpec::new("T [°C]", CanonicalField::Temperature, Unit::Celsius),
                ColumnSpec::new("Dew [°C]", CanonicalField::Dewpoint, Unit::Celsius),
                ColumnSpec::new("Wsp [kn]", CanonicalField::WindSpeed, Unit::Knots),
                ColumnSpec::new("Wdir [°]", CanonicalField::WindDirection, Unit::Degrees),
                ColumnSpec::new("Altitude [m]", CanonicalField::Altitude, Unit::Meters),
            ],
        }
    }

    /// iMet-style export: UTF-8, tab separated, wind in m/s
    pub fn imet() -> Self {
        Self {
            name: "imet".to_string(),
            description: "iMet tab-separated export (UTF-8, wind in m/s)".to_string(),
            encoding: TextEncoding::Utf8,
            delimiter: '\t',
            columns: vec![
                ColumnSpec::new("Pressure (hPa)", CanonicalField::Pressure, Unit::Hectopascal),
                ColumnSpec::new("Air Temp (C)", CanonicalField::Temperature, Unit::Celsius),
                ColumnSpec::new("Dewpoint (C)", CanonicalField::Dewpoint, Unit::Celsius),
                ColumnSpec::new(
                    "Wind Speed (m/s)",
                    CanonicalField::WindSpeed,
                    Unit::MetersPerSecond,
                ),
                ColumnSpec::new("Wind Dir (deg)", CanonicalField::WindDirection, Unit::Degrees),
                ColumnSpec::new("Altitude (m)", CanonicalField::Altitude, Unit::Meters),
            ],
        }
    }

    /// All built-in schemas
    pub fn builtins() -> Vec<InstrumentSchema> {
        vec![Self::windsond(), Self::imet()]
    }

    /// Look up a built-in schema by name
    pub fn builtin(name: &str) -> Result<Self> {
        Self::builtins()
            .into_iter()
            .find(|schema| schema.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| Error::unknown_format(name))
    }

    /// Check the table covers every canonical field exactly once with a unit of
    /// the right quantity
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::configuration("Instrument schema name cannot be empty"));
        }
        if !self.delimiter.is_ascii() {
            return Err(Error::configuration(format!(
                "Schema '{}': delimiter must be a single ASCII character",
                self.name
            )));
        }

        let mut seen_fields = HashSet::new();
        let mut seen_sources = HashSet::new();
        for column in &self.columns {
            if !seen_fields.insert(column.field) {
                return Err(Error::configuration(format!(
                    "Schema '{}': field {} mapped more than once",
                    self.name, column.field
                )));
            }
            if !seen_sources.insert(normalize_header(&column.source)) {
                return Err(Error::configuration(format!(
                    "Schema '{}': column '{}' listed more than once",
                    self.name, column.source
                )));
            }
            if column.unit.quantity() != Quantity::of_field(column.field) {
                return Err(Error::configuration(format!(
                    "Schema '{}': unit {} is not valid for field {}",
                    self.name, column.unit, column.field
                )));
            }
        }

        for field in CanonicalField::ALL {
            if !seen_fields.contains(&field) {
                return Err(Error::configuration(format!(
                    "Schema '{}': no column mapped to field {}",
                    self.name, field
                )));
            }
        }

        Ok(())
    }

    /// Column spec feeding a canonical field
    pub fn column_for(&self, field: CanonicalField) -> Option<&ColumnSpec> {
        self.columns.iter().find(|column| column.field == field)
    }

    /// Delimiter as the byte the CSV reader expects
    pub fn delimiter_byte(&self) -> u8 {
        // validate() guarantees ASCII; fall back to tab for unvalidated tables
        u8::try_from(self.delimiter).unwrap_or(b'\t')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_schemas_are_valid() {
        for schema in InstrumentSchema::builtins() {
            schema.validate().unwrap();
        }
    }

    #[test]
    fn test_builtin_lookup() {
        assert_eq!(InstrumentSchema::builtin("Windsond").unwrap().name, "windsond");
        assert!(matches!(
            InstrumentSchema::builtin("vaisala"),
            Err(Error::UnknownFormat { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_wrong_unit_quantity() {
        let mut schema = InstrumentSchema::windsond();
        schema.columns[3].unit = Unit::Meters;
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_sources_equal_after_whitespace_normalization() {
        let mut schema = InstrumentSchema::imet();
        schema.columns[0].source = "Air  Temp (C)".to_string();
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_missing_field() {
        let mut schema = InstrumentSchema::imet();
        schema.columns.retain(|c| c.field != CanonicalField::Altitude);
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_schema_from_toml() {
        let text = r#"
            name = "custom"
            encoding = "latin1"
            columns = [
                { source = "PRES", field = "pressure", unit = "hPa" },
                { source = "TEMP", field = "temperature", unit = "K" },
                { source = "DWPT", field = "dewpoint", unit = "K" },
                { source = "SPD", field = "wind_speed", unit = "kn" },
                { source = "DIR", field = "wind_direction", unit = "deg" },
                { source = "HGT", field = "altitude", unit = "ft" },
            ]
        "#;
        let schema: InstrumentSchema = toml::from_str(text).unwrap();
        assert_eq!(schema.delimiter, '\t');
        assert_eq!(schema.encoding, TextEncoding::Latin1);
        assert_eq!(
            schema.column_for(CanonicalField::Temperature).unwrap().unit,
            Unit::Kelvin
        );
        schema.validate().unwrap();
    }
}
