//! Moist thermodynamics for parcel theory
//!
//! Pure functions over plain `f64` values: pressures in hPa, temperatures in °C
//! unless the name says Kelvin, mixing ratios in kg/kg.
//!
//! # Architecture
//!
//! - this module - saturation, mixing ratio, dry and moist adiabats, LCL, humidity
//! - [`parcel`] - ParcelAscentEngine: lifted-parcel profile, LFC, EL, CAPE and CIN

pub mod parcel;

pub use parcel::{ParcelAnalysis, ParcelAscentEngine};

use crate::constants::physics::{
    BOLTON_A, BOLTON_B, BOLTON_E0_HPA, CP_D, EPSILON, KAPPA, LV, MAGNUS_A, MAGNUS_B, RD,
    ZERO_CELSIUS_K,
};
use crate::constants::{LCL_MAX_ITERATIONS, LCL_TOLERANCE_HPA, MOIST_STEP_HPA};
use tracing::warn;

/// Saturation vapour pressure over water (hPa), Bolton (1980)
pub fn saturation_vapor_pressure(temperature: f64) -> f64 {
    BOLTON_E0_HPA * (BOLTON_A * temperature / (temperature + BOLTON_B)).exp()
}

/// Mixing ratio for a partial vapour pressure
pub fn mixing_ratio(pressure: f64, vapor_pressure: f64) -> f64 {
    EPSILON * vapor_pressure / (pressure - vapor_pressure).max(f64::EPSILON)
}

pub fn saturation_mixing_ratio(pressure: f64, temperature: f64) -> f64 {
    mixing_ratio(pressure, saturation_vapor_pressure(temperature))
}

/// Vapour pressure carried by a mixing ratio at a pressure (hPa)
pub fn vapor_pressure(pressure: f64, mixing_ratio: f64) -> f64 {
    pressure * mixing_ratio / (EPSILON + mixing_ratio)
}

/// Dewpoint for a vapour pressure, inverse of [`saturation_vapor_pressure`]
pub fn dewpoint_from_vapor_pressure(vapor_pressure: f64) -> f64 {
    let x = (vapor_pressure / BOLTON_E0_HPA).ln();
    BOLTON_B * x / (BOLTON_A - x)
}

/// Temperature after dry adiabatic displacement from (p0, t0) to `pressure`
pub fn dry_lapse(pressure: f64, reference_pressure: f64, reference_temperature: f64) -> f64 {
    (reference_temperature + ZERO_CELSIUS_K) * (pressure / reference_pressure).powf(KAPPA)
        - ZERO_CELSIUS_K
}

/// Pseudo-adiabatic lapse rate dT/dp (K/hPa) for saturated air at (p, T[K])
fn moist_lapse_rate(pressure: f64, temperature_k: f64) -> f64 {
    let rs = saturation_mixing_ratio(pressure, temperature_k - ZERO_CELSIUS_K);
    let numerator = RD * temperature_k + LV * rs;
    let denominator = CP_D + LV * LV * rs * EPSILON / (RD * temperature_k * temperature_k);
    numerator / denominator / pressure
}

/// Temperature after pseudo-adiabatic displacement from (p0, t0) to `pressure`
///
/// Fourth-order Runge-Kutta in pressure with steps no larger than 5 hPa.
pub fn moist_lapse(pressure: f64, reference_pressure: f64, reference_temperature: f64) -> f64 {
    let span = pressure - reference_pressure;
    if span == 0.0 {
        return reference_temperature;
    }

    let steps = (span.abs() / MOIST_STEP_HPA).ceil().max(1.0);
    let h = span / steps;
    let mut p = reference_pressure;
    let mut t = reference_temperature + ZERO_CELSIUS_K;

    for _ in 0..steps as usize {
        let k1 = moist_lapse_rate(p, t);
        let k2 = moist_lapse_rate(p + h / 2.0, t + h / 2.0 * k1);
        let k3 = moist_lapse_rate(p + h / 2.0, t + h / 2.0 * k2);
        let k4 = moist_lapse_rate(p + h, t + h * k3);
        t += h / 6.0 * (k1 + 2.0 * k2 + 2.0 * k3 + k4);
        p += h;
    }

    t - ZERO_CELSIUS_K
}

/// Lifting condensation level (pressure hPa, temperature °C)
///
/// Iterates the saturation intersection: the parcel keeps its surface mixing
/// ratio while its temperature follows the dry adiabat. Converges to within
/// 1e-4 hPa. A saturated or supersaturated parcel condenses where it starts.
pub fn lcl(pressure: f64, temperature: f64, dewpoint: f64) -> (f64, f64) {
    let w = mixing_ratio(pressure, saturation_vapor_pressure(dewpoint));
    let surface_temperature_k = temperature + ZERO_CELSIUS_K;

    let mut p = pressure;
    let mut converged = false;
    for _ in 0..LCL_MAX_ITERATIONS {
        let td = dewpoint_from_vapor_pressure(vapor_pressure(p, w));
        let next = (pressure * ((td + ZERO_CELSIUS_K) / surface_temperature_k).powf(1.0 / KAPPA))
            .min(pressure);
        let delta = (next - p).abs();
        p = next;
        if delta < LCL_TOLERANCE_HPA {
            converged = true;
            break;
        }
    }

    if !converged {
        warn!(
            "LCL iteration did not converge for parcel ({} hPa, {} °C, {} °C); using {:.2} hPa",
            pressure, temperature, dewpoint, p
        );
    }

    let t_lcl = dewpoint_from_vapor_pressure(vapor_pressure(p, w)).min(temperature);
    (p, t_lcl)
}

/// Relative humidity (%) from temperature and dewpoint, Magnus form
pub fn relative_humidity(temperature: f64, dewpoint: f64) -> f64 {
    100.0 * (MAGNUS_A * dewpoint / (MAGNUS_B + dewpoint)).exp()
        / (MAGNUS_A * temperature / (MAGNUS_B + temperature)).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturation_vapor_pressure_reference_values() {
        assert!((saturation_vapor_pressure(0.0) - 6.112).abs() < 1e-12);
        assert!((saturation_vapor_pressure(20.0) - 23.37).abs() < 0.05);
    }

    #[test]
    fn test_dewpoint_inverts_saturation_vapor_pressure() {
        for t in [-40.0, -10.0, 0.0, 15.0, 30.0] {
            let td = dewpoint_from_vapor_pressure(saturation_vapor_pressure(t));
            assert!((td - t).abs() < 1e-9);
        }
    }

    #[test]
    fn test_dry_lapse_conserves_potential_temperature() {
        assert_eq!(dry_lapse(1000.0, 1000.0, 20.0), 20.0);
        let t500 = dry_lapse(500.0, 1000.0, 20.0);
        assert!((t500 - (-32.6)).abs() < 0.2);
        let back = dry_lapse(1000.0, 500.0, t500);
        assert!((back - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_moist_lapse_is_warmer_than_dry() {
        let moist = moist_lapse(500.0, 1000.0, 20.0);
        let dry = dry_lapse(500.0, 1000.0, 20.0);
        assert!(moist > dry);
        assert!(moist > -12.0 && moist < -4.0, "moist adiabat at 500 hPa: {}", moist);
        assert_eq!(moist_lapse(850.0, 850.0, 12.0), 12.0);
    }

    #[test]
    fn test_moist_lapse_is_path_independent() {
        let direct = moist_lapse(400.0, 900.0, 15.0);
        let via = moist_lapse(400.0, 650.0, moist_lapse(650.0, 900.0, 15.0));
        assert!((direct - via).abs() < 1e-3);
    }

    #[test]
    fn test_lcl_sits_on_dry_adiabat_and_saturation() {
        let (p_lcl, t_lcl) = lcl(1000.0, 30.0, 20.0);
        assert!(p_lcl > 855.0 && p_lcl < 880.0, "LCL pressure {}", p_lcl);
        assert!((dry_lapse(p_lcl, 1000.0, 30.0) - t_lcl).abs() < 0.01);
        assert!(t_lcl < 20.0);
    }

    #[test]
    fn test_lcl_reference_value() {
        let (p_lcl, t_lcl) = lcl(943.0, 33.0, 28.0);
        assert!((p_lcl - 877.48).abs() < 0.05, "LCL pressure {}", p_lcl);
        assert!((t_lcl - 26.77).abs() < 0.01, "LCL temperature {}", t_lcl);
    }

    #[test]
    fn test_saturated_parcel_condenses_at_start() {
        let (p_lcl, t_lcl) = lcl(950.0, 12.0, 12.0);
        assert!((p_lcl - 950.0).abs() < 1e-6);
        assert!((t_lcl - 12.0).abs() < 1e-6);
    }

    #[test]
    fn test_relative_humidity() {
        assert!((relative_humidity(15.0, 15.0) - 100.0).abs() < 1e-9);
        let rh = relative_humidity(20.0, 10.0);
        assert!(rh > 50.0 && rh < 55.0);
    }
}
