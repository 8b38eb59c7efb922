//! Wind decomposition into horizontal components

use super::harmonizer::HarmonizedRecord;
use crate::app::models::{CanonicalField, CanonicalLevel};
use crate::constants::{SENTINEL, WIND_DECIMALS, is_sentinel};

pub struct WindDecomposer;

impl WindDecomposer {
    /// Build a canonical level from a harmonized record, deriving u/v
    pub fn decompose(record: &HarmonizedRecord) -> CanonicalLevel {
        let wind_speed = record.get(CanonicalField::WindSpeed);
        let wind_direction = record.get(CanonicalField::WindDirection);
        let (u_wind, v_wind) = wind_components(wind_speed, wind_direction);

        CanonicalLevel {
            pressure: record.get(CanonicalField::Pressure),
            temperature: record.get(CanonicalField::Temperature),
            dewpoint: record.get(CanonicalField::Dewpoint),
            wind_speed,
            wind_direction,
            altitude: record.get(CanonicalField::Altitude),
            u_wind,
            v_wind,
        }
    }
}

/// u = s·sin(θ), v = s·cos(θ), each rounded half-to-even to three decimals
///
/// A sentinel in either input makes both components the sentinel.
pub fn wind_components(speed: f64, direction_deg: f64) -> (f64, f64) {
    if is_sentinel(speed) || is_sentinel(direction_deg) {
        return (SENTINEL, SENTINEL);
    }
    let radians = direction_deg.to_radians();
    (
        round_decimals(speed * radians.sin()),
        round_decimals(speed * radians.cos()),
    )
}

fn round_decimals(value: f64) -> f64 {
    let scale = 10f64.powi(WIND_DECIMALS);
    // -0.0 prints as "-0" in the profile table
    (value * scale).round_ties_even() / scale + 0.0
}
