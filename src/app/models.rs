//! Data models for sounding processing
//!
//! This module contains the core data structures for representing a radiosonde
//! sounding once it has been cleaned and harmonized: the canonical level, the
//! ordered profile, the reference level set used for annotation, and the computed
//! index set handed to the renderer.

use crate::constants::{STANDARD_LEVELS_HPA, haines_levels, is_sentinel};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical fields every instrument format is mapped onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Pressure,
    Temperature,
    Dewpoint,
    WindSpeed,
    WindDirection,
    Altitude,
}

impl CanonicalField {
    /// All canonical fields in record order
    pub const ALL: [CanonicalField; 6] = [
        CanonicalField::Pressure,
        CanonicalField::Temperature,
        CanonicalField::Dewpoint,
        CanonicalField::WindSpeed,
        CanonicalField::WindDirection,
        CanonicalField::Altitude,
    ];

    /// Position of this field inside fixed-size canonical arrays
    pub fn index(self) -> usize {
        match self {
            CanonicalField::Pressure => 0,
            CanonicalField::Temperature => 1,
            CanonicalField::Dewpoint => 2,
            CanonicalField::WindSpeed => 3,
            CanonicalField::WindDirection => 4,
            CanonicalField::Altitude => 5,
        }
    }

    /// Canonical column name
    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalField::Pressure => "pressure",
            CanonicalField::Temperature => "temperature",
            CanonicalField::Dewpoint => "dewpoint",
            CanonicalField::WindSpeed => "wind_speed",
            CanonicalField::WindDirection => "wind_direction",
            CanonicalField::Altitude => "altitude",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CanonicalField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        CanonicalField::ALL
            .into_iter()
            .find(|field| field.as_str() == s.trim())
            .ok_or_else(|| Error::configuration(format!("Unknown canonical field '{}'", s)))
    }
}

/// One atmospheric observation in canonical units
///
/// Pressure in hPa, temperature and dewpoint in °C, wind speed in m/s, wind
/// direction in degrees (meteorological, 0 = from north, clockwise), altitude in
/// metres. `u_wind`/`v_wind` are derived by the wind decomposer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanonicalLevel {
    pub pressure: f64,
    pub temperature: f64,
    pub dewpoint: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub altitude: f64,
    pub u_wind: f64,
    pub v_wind: f64,
}

impl CanonicalLevel {
    /// True if any field checked by profile assembly carries the sentinel
    pub fn has_sentinel(&self) -> bool {
        [
            self.pressure,
            self.temperature,
            self.dewpoint,
            self.u_wind,
            self.v_wind,
        ]
        .into_iter()
        .any(is_sentinel)
    }

    /// Dew-point depression (°C)
    pub fn dewpoint_depression(&self) -> f64 {
        self.temperature - self.dewpoint
    }
}

/// Ordered vertical profile
///
/// Levels are strictly descending by pressure with unique pressures, and no level
/// carries the sentinel in pressure, temperature, dewpoint, u_wind or v_wind.
/// The first level is the surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    levels: Vec<CanonicalLevel>,
}

impl Profile {
    /// Build a profile, validating ordering and sentinel invariants
    pub fn new(levels: Vec<CanonicalLevel>) -> Result<Self> {
        if levels.is_empty() {
            return Err(Error::EmptyProfile { records_seen: 0 });
        }

        if let Some(position) = levels.iter().position(CanonicalLevel::has_sentinel) {
            return Err(Error::invalid_profile(format!(
                "level {} carries the missing-value sentinel",
                position
            )));
        }

        if let Some(position) = levels
            .windows(2)
            .position(|pair| pair[0].pressure <= pair[1].pressure)
        {
            return Err(Error::invalid_profile(format!(
                "pressure not strictly descending at level {} ({} hPa then {} hPa)",
                position + 1,
                levels[position].pressure,
                levels[position + 1].pressure
            )));
        }

        Ok(Self { levels })
    }

    /// Read-only view of the levels
    pub fn levels(&self) -> &[CanonicalLevel] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Lowest (highest-pressure) level
    pub fn surface(&self) -> &CanonicalLevel {
        &self.levels[0]
    }

    /// Highest (lowest-pressure) level
    pub fn top(&self) -> &CanonicalLevel {
        &self.levels[self.levels.len() - 1]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CanonicalLevel> {
        self.levels.iter()
    }

    pub fn pressures(&self) -> Vec<f64> {
        self.levels.iter().map(|level| level.pressure).collect()
    }

    pub fn temperatures(&self) -> Vec<f64> {
        self.levels.iter().map(|level| level.temperature).collect()
    }

    pub fn dewpoints(&self) -> Vec<f64> {
        self.levels.iter().map(|level| level.dewpoint).collect()
    }

    /// Fail unless the profile has at least `required` levels
    pub fn require_levels(&self, required: usize) -> Result<()> {
        if self.levels.len() < required {
            return Err(Error::InsufficientLevels {
                levels: self.levels.len(),
                required,
            });
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Profile {
    type Item = &'a CanonicalLevel;
    type IntoIter = std::slice::Iter<'a, CanonicalLevel>;

    fn into_iter(self) -> Self::IntoIter {
        self.levels.iter()
    }
}

/// Target pressure levels for reference selection (hPa, descending, unique)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLevelSet {
    levels: Vec<f64>,
}

impl ReferenceLevelSet {
    /// Standard RAOB levels
    pub fn standard() -> Self {
        Self::from_levels(STANDARD_LEVELS_HPA.iter().copied())
    }

    /// Standard RAOB levels plus custom levels
    pub fn with_custom(custom: &[f64]) -> Self {
        Self::from_levels(STANDARD_LEVELS_HPA.iter().chain(custom).copied())
    }

    /// Arbitrary level set, sorted descending with duplicates removed
    pub fn from_levels(levels: impl IntoIterator<Item = f64>) -> Self {
        let mut levels: Vec<f64> = levels.into_iter().collect();
        levels.sort_by(|a, b| b.total_cmp(a));
        levels.dedup();
        Self { levels }
    }

    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl Default for ReferenceLevelSet {
    fn default() -> Self {
        Self::standard()
    }
}

/// Haines Index elevation class
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum HainesElevation {
    /// 950 / 850 / 700 hPa
    #[default]
    Low,
    /// 850 / 700 / 500 hPa
    Mid,
    /// 700 / 500 / 400 hPa
    High,
}

impl HainesElevation {
    /// Pressure triple (lower, middle, upper) for this class
    pub fn levels(self) -> [f64; 3] {
        match self {
            HainesElevation::Low => haines_levels::LOW,
            HainesElevation::Mid => haines_levels::MID,
            HainesElevation::High => haines_levels::HIGH,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HainesElevation::Low => "low",
            HainesElevation::Mid => "mid",
            HainesElevation::High => "high",
        }
    }
}

impl fmt::Display for HainesElevation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HainesElevation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(HainesElevation::Low),
            "mid" | "middle" => Ok(HainesElevation::Mid),
            "high" => Ok(HainesElevation::High),
            other => Err(Error::configuration(format!(
                "Unknown Haines elevation class '{}' (expected low, mid or high)",
                other
            ))),
        }
    }
}

/// Surface-derived scalars
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceMetrics {
    /// Surface pressure (hPa)
    pub pressure: f64,
    /// Surface temperature (°C)
    pub temperature: f64,
    /// Surface dewpoint (°C)
    pub dewpoint: f64,
    /// Wind speed, magnitude of (u, v), in canonical m/s
    pub wind_speed: f64,
    /// Wind direction (degrees)
    pub wind_direction: f64,
    /// Relative humidity (%)
    pub relative_humidity: f64,
    /// Dew-point depression (°C)
    pub dewpoint_depression: f64,
}

/// Indices computed once per profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSet {
    /// Convective available potential energy (J/kg), never negative
    pub cape: f64,
    /// Convective inhibition (J/kg), never positive
    pub cin: f64,
    pub lcl_pressure: f64,
    pub lcl_temperature: f64,
    /// Undefined when the parcel never becomes buoyant
    pub lfc_pressure: Option<f64>,
    /// Undefined without an LFC, or when the parcel is still buoyant at the top
    pub el_pressure: Option<f64>,
    /// Haines Index, 2 through 6
    pub haines_index: u8,
    pub haines_elevation: HainesElevation,
    /// Mixing height estimate (m above the surface)
    pub mixing_height: f64,
    pub surface: SurfaceMetrics,
}

impl IndexSet {
    /// Whether a level of free convection was found
    pub fn has_convection(&self) -> bool {
        self.lfc_pressure.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(pressure: f64, temperature: f64) -> CanonicalLevel {
        CanonicalLevel {
            pressure,
            temperature,
            dewpoint: temperature - 5.0,
            wind_speed: 5.0,
            wind_direction: 180.0,
            altitude: 0.0,
            u_wind: 0.0,
            v_wind: -5.0,
        }
    }

    #[test]
    fn test_profile_rejects_non_descending_pressure() {
        let result = Profile::new(vec![level(900.0, 10.0), level(950.0, 12.0)]);
        assert!(matches!(result, Err(Error::InvalidProfile { .. })));

        let result = Profile::new(vec![level(900.0, 10.0), level(900.0, 12.0)]);
        assert!(matches!(result, Err(Error::InvalidProfile { .. })));
    }

    #[test]
    fn test_profile_rejects_sentinel_levels() {
        let mut bad = level(850.0, 5.0);
        bad.dewpoint = -99.9;
        let result = Profile::new(vec![level(900.0, 10.0), bad]);
        assert!(matches!(result, Err(Error::InvalidProfile { .. })));
    }

    #[test]
    fn test_profile_accessors() {
        let profile = Profile::new(vec![level(1000.0, 20.0), level(850.0, 10.0)]).unwrap();
        assert_eq!(profile.len(), 2);
        assert_eq!(profile.surface().pressure, 1000.0);
        assert_eq!(profile.top().pressure, 850.0);
        assert!(profile.require_levels(2).is_ok());
        assert!(matches!(
            profile.require_levels(3),
            Err(Error::InsufficientLevels { levels: 2, required: 3 })
        ));
    }

    #[test]
    fn test_reference_level_set_merges_custom_levels() {
        let set = ReferenceLevelSet::with_custom(&[975.0, 850.0]);
        assert_eq!(set.len(), STANDARD_LEVELS_HPA.len() + 1);
        assert_eq!(set.levels()[0], 1000.0);
        assert_eq!(set.levels()[1], 975.0);
        assert!(set.levels().windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_haines_elevation_parsing() {
        assert_eq!("LOW".parse::<HainesElevation>().unwrap(), HainesElevation::Low);
        assert_eq!("mid".parse::<HainesElevation>().unwrap(), HainesElevation::Mid);
        assert_eq!(HainesElevation::High.levels(), [700.0, 500.0, 400.0]);
        assert!("alpine".parse::<HainesElevation>().is_err());
    }

    #[test]
    fn test_canonical_field_round_trip_names() {
        for field in CanonicalField::ALL {
            assert_eq!(field.as_str().parse::<CanonicalField>().unwrap(), field);
        }
    }
}
