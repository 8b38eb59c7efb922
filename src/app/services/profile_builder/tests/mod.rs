//! Tests for profile assembly
//!
//! Fixture helpers build canonical levels directly so the assembly rules can be
//! exercised without going through the text parser.


use crate::app::models::CanonicalLevel;
use crate::app::services::sounding_parser::wind::wind_components;
use crate::constants::SENTINEL;

/// Level built the way the parser would from (p, t, td, speed m/s, direction)
pub fn create_test_level(
    pressure: f64,
    temperature: f64,
    dewpoint: f64,
    wind_speed: f64,
    wind_direction: f64,
) -> CanonicalLevel {
    let (u_wind, v_wind) = wind_components(wind_speed, wind_direction);
    CanonicalLevel {
        pressure,
        temperature,
        dewpoint,
        wind_speed,
        wind_direction,
        altitude: (1000.0 - pressure) * 8.4,
        u_wind,
        v_wind,
    }
}

/// Level with every measured field missing except pressure
pub fn create_missing_level(pressure: f64) -> CanonicalLevel {
    create_test_level(pressure, SENTINEL, SENTINEL, SENTINEL, SENTINEL)
}
