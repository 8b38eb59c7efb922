//! Unit tags and pure conversions
//!
//! Values travel as explicit (value, unit) pairs until the harmonizer converts
//! them onto the canonical system: hPa, °C, m/s, degrees, metres. The sentinel is
//! never converted, so a missing knots reading stays -99.9 after conversion to m/s
//! and is still caught at profile assembly.

use crate::app::models::CanonicalField;
use crate::constants::{is_sentinel, physics::ZERO_CELSIUS_K};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const KNOT_IN_MPS: f64 = 1852.0 / 3600.0;
const MPH_IN_MPS: f64 = 0.44704;
const FOOT_IN_M: f64 = 0.3048;

/// Physical quantity a unit measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantity {
    Pressure,
    Temperature,
    Speed,
    Angle,
    Length,
}

impl Quantity {
    /// Quantity carried by a canonical field
    pub fn of_field(field: CanonicalField) -> Self {
        match field {
            CanonicalField::Pressure => Quantity::Pressure,
            CanonicalField::Temperature | CanonicalField::Dewpoint => Quantity::Temperature,
            CanonicalField::WindSpeed => Quantity::Speed,
            CanonicalField::WindDirection => Quantity::Angle,
            CanonicalField::Altitude => Quantity::Length,
        }
    }

    /// Canonical unit for this quantity
    pub fn canonical_unit(self) -> Unit {
        match self {
            Quantity::Pressure => Unit::Hectopascal,
            Quantity::Temperature => Unit::Celsius,
            Quantity::Speed => Unit::MetersPerSecond,
            Quantity::Angle => Unit::Degrees,
            Quantity::Length => Unit::Meters,
        }
    }
}

/// Unit tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    #[serde(alias = "hPa", alias = "hpa", alias = "mb", alias = "mbar")]
    Hectopascal,
    #[serde(alias = "Pa", alias = "pa")]
    Pascal,
    #[serde(alias = "kPa", alias = "kpa")]
    Kilopascal,
    #[serde(alias = "C", alias = "degC", alias = "°C")]
    Celsius,
    #[serde(alias = "K")]
    Kelvin,
    #[serde(alias = "F", alias = "degF", alias = "°F")]
    Fahrenheit,
    #[serde(alias = "m/s", alias = "mps")]
    MetersPerSecond,
    #[serde(alias = "kn", alias = "kt", alias = "kts")]
    Knots,
    #[serde(alias = "km/h", alias = "kph")]
    KilometersPerHour,
    #[serde(alias = "mph")]
    MilesPerHour,
    #[serde(alias = "deg", alias = "°")]
    Degrees,
    #[serde(alias = "m")]
    Meters,
    #[serde(alias = "ft")]
    Feet,
}

impl Unit {
    pub fn quantity(self) -> Quantity {
        match self {
            Unit::Hectopascal | Unit::Pascal | Unit::Kilopascal => Quantity::Pressure,
            Unit::Celsius | Unit::Kelvin | Unit::Fahrenheit => Quantity::Temperature,
            Unit::MetersPerSecond | Unit::Knots | Unit::KilometersPerHour | Unit::MilesPerHour => {
                Quantity::Speed
            }
            Unit::Degrees => Quantity::Angle,
            Unit::Meters | Unit::Feet => Quantity::Length,
        }
    }

    /// Short symbol used in reports and schema listings
    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Hectopascal => "hPa",
            Unit::Pascal => "Pa",
            Unit::Kilopascal => "kPa",
            Unit::Celsius => "°C",
            Unit::Kelvin => "K",
            Unit::Fahrenheit => "°F",
            Unit::MetersPerSecond => "m/s",
            Unit::Knots => "kt",
            Unit::KilometersPerHour => "km/h",
            Unit::MilesPerHour => "mph",
            Unit::Degrees => "°",
            Unit::Meters => "m",
            Unit::Feet => "ft",
        }
    }

    /// Convert a value in this unit to the canonical unit of its quantity
    pub fn to_canonical(self, value: f64) -> f64 {
        match self {
            Unit::Hectopascal
            | Unit::Celsius
            | Unit::MetersPerSecond
            | Unit::Degrees
            | Unit::Meters => value,
            Unit::Pascal => value / 100.0,
            Unit::Kilopascal => value * 10.0,
            Unit::Kelvin => value - ZERO_CELSIUS_K,
            Unit::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
            Unit::Knots => value * KNOT_IN_MPS,
            Unit::KilometersPerHour => value / 3.6,
            Unit::MilesPerHour => value * MPH_IN_MPS,
            Unit::Feet => value * FOOT_IN_M,
        }
    }

    /// Convert a canonical value into this unit
    pub fn from_canonical(self, value: f64) -> f64 {
        match self {
            Unit::Hectopascal
            | Unit::Celsius
            | Unit::MetersPerSecond
            | Unit::Degrees
            | Unit::Meters => value,
            Unit::Pascal => value * 100.0,
            Unit::Kilopascal => value / 10.0,
            Unit::Kelvin => value + ZERO_CELSIUS_K,
            Unit::Fahrenheit => value * 9.0 / 5.0 + 32.0,
            Unit::Knots => value / KNOT_IN_MPS,
            Unit::KilometersPerHour => value * 3.6,
            Unit::MilesPerHour => value / MPH_IN_MPS,
            Unit::Feet => value / FOOT_IN_M,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Unit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let unit = match s.trim() {
            "hPa" | "hpa" | "mb" | "mbar" | "hectopascal" => Unit::Hectopascal,
            "Pa" | "pa" | "pascal" => Unit::Pascal,
            "kPa" | "kpa" | "kilopascal" => Unit::Kilopascal,
            "C" | "degC" | "°C" | "celsius" => Unit::Celsius,
            "K" | "kelvin" => Unit::Kelvin,
            "F" | "degF" | "°F" | "fahrenheit" => Unit::Fahrenheit,
            "m/s" | "mps" | "meters_per_second" => Unit::MetersPerSecond,
            "kn" | "kt" | "kts" | "knots" => Unit::Knots,
            "km/h" | "kph" | "kilometers_per_hour" => Unit::KilometersPerHour,
            "mph" | "miles_per_hour" => Unit::MilesPerHour,
            "deg" | "°" | "degrees" => Unit::Degrees,
            "m" | "meters" => Unit::Meters,
            "ft" | "feet" => Unit::Feet,
            other => {
                return Err(Error::configuration(format!("Unknown unit '{}'", other)));
            }
        };
        Ok(unit)
    }
}

/// A value tagged with its unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub value: f64,
    pub unit: Unit,
}

impl Measurement {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    pub fn is_missing(&self) -> bool {
        is_sentinel(self.value)
    }

    /// Canonical value; the sentinel passes through untouched
    pub fn canonical(&self) -> f64 {
        if self.is_missing() {
            self.value
        } else {
            self.unit.to_canonical(self.value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SENTINEL;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_knots_to_meters_per_second() {
        assert!(close(Unit::Knots.to_canonical(10.0), 5.144444444444445));
        assert!(close(Unit::Knots.from_canonical(Unit::Knots.to_canonical(37.0)), 37.0));
    }

    #[test]
    fn test_pressure_and_temperature_conversions() {
        assert!(close(Unit::Pascal.to_canonical(85000.0), 850.0));
        assert!(close(Unit::Kilopascal.to_canonical(85.0), 850.0));
        assert!(close(Unit::Kelvin.to_canonical(273.15), 0.0));
        assert!(close(Unit::Fahrenheit.to_canonical(212.0), 100.0));
        assert!(close(Unit::Feet.to_canonical(1000.0), 304.8));
    }

    #[test]
    fn test_sentinel_is_never_converted() {
        let missing = Measurement::new(SENTINEL, Unit::Knots);
        assert_eq!(missing.canonical(), SENTINEL);

        let kelvin = Measurement::new(SENTINEL, Unit::Kelvin);
        assert_eq!(kelvin.canonical(), SENTINEL);
        assert!(kelvin.is_missing());

        let speed = Measurement::new(10.0, Unit::Knots);
        assert!(close(speed.canonical(), 5.144444444444445));
    }

    #[test]
    fn test_unit_parsing() {
        assert_eq!("kn".parse::<Unit>().unwrap(), Unit::Knots);
        assert_eq!("°C".parse::<Unit>().unwrap(), Unit::Celsius);
        assert_eq!("hPa".parse::<Unit>().unwrap(), Unit::Hectopascal);
        assert!("furlong".parse::<Unit>().is_err());
    }

    #[test]
    fn test_field_quantities() {
        assert_eq!(
            Quantity::of_field(CanonicalField::Dewpoint).canonical_unit(),
            Unit::Celsius
        );
        assert_eq!(
            Quantity::of_field(CanonicalField::WindSpeed).canonical_unit(),
            Unit::MetersPerSecond
        );
    }
}
