//! Tests for header resolution and record iteration

use super::*;
use crate::Error;
use crate::app::services::sounding_parser::TextEncoding;
use crate::constants::SENTINEL;

#[test]
fn test_records_skip_header_and_number_lines() {
    let text = windsond_text(&[
        ["1000", "20", "15", "10", "180"],
        ["900", "15", "10", "15", "190"],
    ]);
    let parser = FormatParser::new(InstrumentSchema::windsond());
    let records: Vec<_> = parser
        .records(&text)
        .unwrap()
        .collect::<Result<Vec<_>>>()
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].line, 2);
    assert_eq!(records[1].line, 3);
    assert_eq!(records[0].get(1), "1000");
}

#[test]
fn test_missing_schema_column_is_schema_mismatch() {
    let text = "P [h Pa]\tT [°C]\tDew [°C]\tWsp [kn]\tAltitude [m]\n1000\t20\t15\t10\t0";
    let parser = FormatParser::new(InstrumentSchema::windsond());
    let result = parser.records(text);

    match result {
        Err(Error::SchemaMismatch { format, column, .. }) => {
            assert_eq!(format, "windsond");
            assert_eq!(column, "Wdir [°]");
        }
        other => panic!("expected SchemaMismatch, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_latin1_export_decodes_and_parses() {
    let text = windsond_text(&[["1000", "20", "15", "10", "180"]]);
    let bytes = latin1_bytes(&text);
    let parser = FormatParser::new(InstrumentSchema::windsond());

    let decoded = parser.decode(&bytes).unwrap();
    assert!(parser.records(&decoded).is_ok());

    // The same bytes are not valid UTF-8
    assert!(matches!(
        TextEncoding::Utf8.decode(&bytes),
        Err(Error::Encoding { .. })
    ));
}

#[test]
fn test_ragged_rows_read_missing_fields_as_sentinel() {
    let text = format!("{}\n0\t950\t12\t8", WINDSOND_HEADER);
    let levels = parse_levels(&InstrumentSchema::windsond(), &text).unwrap();

    assert_eq!(levels.len(), 1);
    assert_eq!(levels[0].pressure, 950.0);
    assert_eq!(levels[0].wind_speed, SENTINEL);
    assert_eq!(levels[0].u_wind, SENTINEL);
    assert_eq!(levels[0].altitude, SENTINEL);
}

#[test]
fn test_header_whitespace_is_normalized() {
    let text = "P  [h Pa]\t T [°C] \tDew [°C]\tWsp [kn]\tWdir [°]\tAltitude [m]\n1000\t20\t15\t10\t180\t0";
    let levels = parse_levels(&InstrumentSchema::windsond(), text).unwrap();
    assert_eq!(levels.len(), 1);
    assert_eq!(levels[0].temperature, 20.0);
}

#[test]
fn test_header_only_yields_no_records() {
    let parser = FormatParser::new(InstrumentSchema::windsond());
    let records = parser.records(WINDSOND_HEADER).unwrap();
    assert_eq!(records.count(), 0);
}

#[test]
fn test_schema_source_whitespace_is_normalized() {
    let mut schema = InstrumentSchema::imet();
    for column in &mut schema.columns {
        if column.source == "Wind Speed (m/s)" {
            column.source = "Wind  Speed (m/s) ".to_string();
        }
    }
    schema.validate().unwrap();

    let text = "Pressure (hPa)\tAir Temp (C)\tDewpoint (C)\tWind Speed (m/s)\tWind Dir (deg)\tAltitude (m)\n\
                1000\t20\t15\t5\t180\t0";
    let levels = parse_levels(&schema, text).unwrap();
    assert_eq!(levels.len(), 1);
    assert_eq!(levels[0].wind_speed, 5.0);

    let parser = FormatParser::new(schema.clone());
    let records = parser.records(text).unwrap();
    assert!(records.mapping().extra_columns(&schema).is_empty());
}
